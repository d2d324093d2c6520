#![forbid(unsafe_code)]
//! # orion-macros
//!
//! Procedural macros that remove boilerplate recurring across the Orion Trading Event Core's
//! per-crate error enums.
//!
//! ## `IntoCommandError`
//! Every command-facing error enum maps each variant to one of the closed
//! [`orion_core::command::ErrorCode`] values (spec.md §4, "Errors"). Tag each variant with
//! `#[code(...)]` and derive the mapping instead of hand-writing the match:
//!
//! ```rust,ignore
//! use orion_macros::IntoCommandError;
//!
//! #[derive(thiserror::Error, Debug, Clone, IntoCommandError)]
//! enum RfqError {
//!     #[code(NotFound)]
//!     #[error("rfq not found")]
//!     NotFound,
//!     #[code(Conflict)]
//!     #[error("version conflict: expected {expected}, found {actual}")]
//!     Conflict { expected: u64, actual: u64 },
//! }
//! ```
//!
//! generates `impl RfqError { pub fn into_command_error(self, correlation_id: uuid::Uuid) ->
//! orion_core::command::CommandError { ... } }`.

extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields};

/// See the crate-level docs for usage. Requires every variant to carry exactly one
/// `#[code(ErrorCodeVariant)]` attribute; panics at macro-expansion time otherwise, which
/// surfaces as a compile error pointing at the derive.
#[proc_macro_derive(IntoCommandError, attributes(code))]
pub fn into_command_error_derive(input: TokenStream) -> TokenStream {
    let ast: DeriveInput =
        syn::parse(input).expect("IntoCommandError derive failed to parse input TokenStream");

    let name = &ast.ident;
    let Data::Enum(data) = &ast.data else {
        panic!("IntoCommandError can only be derived for enums");
    };

    let arms = data.variants.iter().map(|variant| {
        let variant_ident = &variant.ident;

        let pattern = match &variant.fields {
            Fields::Unit => quote! { #name::#variant_ident },
            Fields::Unnamed(_) => quote! { #name::#variant_ident(..) },
            Fields::Named(_) => quote! { #name::#variant_ident { .. } },
        };

        let code_attr = variant
            .attrs
            .iter()
            .find(|attr| attr.path().is_ident("code"))
            .unwrap_or_else(|| panic!("variant {variant_ident} is missing #[code(...)]"));
        let code_ident: syn::Ident = code_attr
            .parse_args()
            .unwrap_or_else(|_| panic!("expected #[code(ErrorCodeVariant)] on {variant_ident}"));

        quote! { #pattern => orion_core::command::ErrorCode::#code_ident, }
    });

    let generated = quote! {
        impl #name {
            pub fn into_command_error(self, correlation_id: uuid::Uuid) -> orion_core::command::CommandError {
                let code = match &self {
                    #(#arms)*
                };
                orion_core::command::CommandError::new(code, self.to_string(), correlation_id)
            }
        }
    };

    TokenStream::from(generated)
}
