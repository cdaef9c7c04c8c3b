//! Derive macro that turns a plain Rust enum into a structured action-error
//! source: one stable `code` and `[Placeholder]` `template` string per
//! variant, with named fields exposed as `parameters`.
//!
//! One enum per subsystem, one `#[error(..)]` attribute per variant
//! carrying a code and a human template, using the `[Name]`-placeholder
//! template syntax this workspace's action-error taxonomy relies on
//! instead of `{name}` interpolation.

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Lit, LitStr, Meta, parse_macro_input};

#[proc_macro_derive(ActionError, attributes(error))]
pub fn derive_action_error(input: TokenStream) -> TokenStream {
	let input = parse_macro_input!(input as DeriveInput);
	let enum_name = &input.ident;

	let group = enum_group(&input).unwrap_or_else(|| {
		// Default group is the snake_case enum name; good enough when the
		// author didn't bother annotating the enum itself.
		to_snake_case(&enum_name.to_string())
	});

	let data = match &input.data {
		Data::Enum(data) => data,
		_ => {
			return syn::Error::new_spanned(&input, "ActionError can only be derived on enums")
				.to_compile_error()
				.into();
		}
	};

	let mut code_arms = Vec::new();
	let mut template_arms = Vec::new();
	let mut parameters_arms = Vec::new();

	for variant in &data.variants {
		let variant_ident = &variant.ident;
		let (code, template) = match variant_attr(variant) {
			Ok(v) => v,
			Err(e) => return e.to_compile_error().into(),
		};
		let full_code = if group.is_empty() {
			code.clone()
		} else {
			format!("{}.{}", group, code)
		};

		match &variant.fields {
			Fields::Unit => {
				code_arms.push(quote! { #enum_name::#variant_ident => #full_code });
				template_arms.push(quote! { #enum_name::#variant_ident => #template });
				parameters_arms.push(quote! {
					#enum_name::#variant_ident => ::std::collections::BTreeMap::new()
				});
			}
			Fields::Named(named) => {
				let field_idents: Vec<_> =
					named.named.iter().map(|f| f.ident.clone().unwrap()).collect();
				let field_names: Vec<_> =
					field_idents.iter().map(|i| i.to_string()).collect();

				code_arms.push(quote! {
					#enum_name::#variant_ident { .. } => #full_code
				});
				template_arms.push(quote! {
					#enum_name::#variant_ident { .. } => #template
				});
				parameters_arms.push(quote! {
					#enum_name::#variant_ident { #(#field_idents),* } => {
						let mut map = ::std::collections::BTreeMap::new();
						#( map.insert(#field_names.to_string(), #field_idents.to_string()); )*
						map
					}
				});
			}
			Fields::Unnamed(_) => {
				return syn::Error::new_spanned(
					variant,
					"ActionError variants must be unit or have named fields",
				)
				.to_compile_error()
				.into();
			}
		}
	}

	let expanded = quote! {
		impl rt_error::ActionErrorInfo for #enum_name {
			fn code(&self) -> String {
				match self {
					#(#code_arms),*
				}.to_string()
			}

			fn template(&self) -> &'static str {
				match self {
					#(#template_arms),*
				}
			}

			fn parameters(&self) -> ::std::collections::BTreeMap<String, String> {
				match self {
					#(#parameters_arms),*
				}
			}
		}
	};

	expanded.into()
}

fn enum_group(input: &DeriveInput) -> Option<String> {
	for attr in &input.attrs {
		if !attr.path().is_ident("error") {
			continue;
		}
		if let Ok(lit) = attr.parse_args::<LitStr>() {
			return Some(lit.value());
		}
	}
	None
}

fn variant_attr(variant: &syn::Variant) -> syn::Result<(String, String)> {
	for attr in &variant.attrs {
		if !attr.path().is_ident("error") {
			continue;
		}
		let Meta::List(list) = &attr.meta else {
			continue;
		};
		let lits = list.parse_args_with(
			syn::punctuated::Punctuated::<Lit, syn::Token![,]>::parse_terminated,
		)?;
		let mut iter = lits.into_iter();
		let code = match iter.next() {
			Some(Lit::Str(s)) => s.value(),
			_ => {
				return Err(syn::Error::new_spanned(
					attr,
					"expected #[error(\"code\", \"template\")]",
				));
			}
		};
		let template = match iter.next() {
			Some(Lit::Str(s)) => s.value(),
			_ => code.clone(),
		};
		return Ok((code, template));
	}
	Err(syn::Error::new_spanned(
		variant,
		"every ActionError variant needs #[error(\"code\", \"template\")]",
	))
}

fn to_snake_case(s: &str) -> String {
	let mut out = String::new();
	for (i, ch) in s.char_indices() {
		if ch.is_uppercase() {
			if i != 0 {
				out.push('_');
			}
			out.extend(ch.to_lowercase());
		} else {
			out.push(ch);
		}
	}
	out
}
