//! PointModel derive macro for Qdrant-backed entity types.
//!
//! This crate provides the [`PointModel`](macro@PointModel) derive macro. It implements
//! `qentity::PointType` and `qentity::PointModel` for a struct, wiring the struct's
//! `id` and `vector` fields into the point conversion contract.
//!
//! Every entity must declare its discriminator. A struct without
//! `#[point_model(point_type = "...")]` does not compile, so a missing
//! discriminator can never reach runtime.
//!
//! # Examples
//!
//! ```ignore
//! use qentity::{PointId, PointModel, VectorMap};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Serialize, Deserialize, PointModel)]
//! #[point_model(point_type = "article")]
//! pub struct Article {
//!     pub id: PointId,
//!     pub vector: Option<VectorMap>,
//!     pub title: String,
//! }
//!
//! assert_eq!(Article::POINT_TYPE, "article");
//! ```
//!
//! Running `validator` rules after every decode:
//!
//! ```ignore
//! #[derive(Serialize, Deserialize, Validate, PointModel)]
//! #[point_model(point_type = "comment", validate)]
//! pub struct Comment {
//!     pub id: PointId,
//!     pub vector: Option<VectorMap>,
//!     #[validate(length(min = 1))]
//!     pub body: String,
//! }
//! ```

extern crate proc_macro;

use darling::{FromDeriveInput, FromField};
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// Key under which the discriminator is written into the payload.
const DISCRIMINATOR_KEY: &str = "point_type";

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(point_model))]
struct PointModelInput {
    ident: syn::Ident,
    generics: syn::Generics,
    data: darling::ast::Data<(), PointModelField>,
    #[darling(default)]
    point_type: Option<String>,
    #[darling(default)]
    validate: bool,
}

#[derive(Debug, FromField)]
struct PointModelField {
    ident: Option<syn::Ident>,
}

/// Derives `PointType` and `PointModel` for a point entity.
///
/// # Attributes
///
/// - `point_type` (required): the discriminator stored in every payload
/// - `validate`: run `validator::Validate` after decoding a payload
///
/// # Requirements
///
/// - a struct with named fields
/// - an `id: qentity::PointId` field
/// - a `vector: Option<qentity::VectorMap>` field
/// - no field named `point_type`
#[proc_macro_derive(PointModel, attributes(point_model))]
pub fn point_model_derive(input: TokenStream) -> TokenStream {
    let ast: DeriveInput = parse_macro_input!(input as DeriveInput);
    let receiver = match PointModelInput::from_derive_input(&ast) {
        Ok(receiver) => receiver,
        Err(err) => return TokenStream::from(err.write_errors()),
    };

    match impl_point_model(receiver) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn impl_point_model(receiver: PointModelInput) -> syn::Result<proc_macro2::TokenStream> {
    let ident = &receiver.ident;

    let point_type = match receiver.point_type.as_deref().map(str::trim) {
        Some("") => {
            return Err(syn::Error::new_spanned(
                ident,
                format!("{} declares an empty point_type", ident),
            ));
        }
        Some(point_type) => point_type.to_string(),
        None => {
            return Err(syn::Error::new_spanned(
                ident,
                format!(
                    "{} must declare #[point_model(point_type = \"...\")]",
                    ident
                ),
            ));
        }
    };

    let fields = match receiver.data {
        darling::ast::Data::Struct(fields) => fields.fields,
        darling::ast::Data::Enum(_) => {
            return Err(syn::Error::new_spanned(
                ident,
                "PointModel can only be derived for structs with named fields",
            ));
        }
    };

    let mut has_id = false;
    let mut has_vector = false;

    for field in &fields {
        let Some(field_ident) = &field.ident else {
            return Err(syn::Error::new_spanned(
                ident,
                "PointModel can only be derived for structs with named fields",
            ));
        };

        match field_ident.to_string().as_str() {
            "id" => has_id = true,
            "vector" => has_vector = true,
            DISCRIMINATOR_KEY => {
                return Err(syn::Error::new_spanned(
                    field_ident,
                    "point_type is reserved for the discriminator and cannot be a field",
                ));
            }
            _ => {}
        }
    }

    if !has_id {
        return Err(syn::Error::new_spanned(
            ident,
            format!("{} is missing the `id: PointId` field", ident),
        ));
    }

    if !has_vector {
        return Err(syn::Error::new_spanned(
            ident,
            format!("{} is missing the `vector: Option<VectorMap>` field", ident),
        ));
    }

    let (impl_generics, ty_generics, where_clause) = receiver.generics.split_for_impl();

    let validate = if receiver.validate {
        quote! {
            fn validate_fields(
                &self,
            ) -> ::core::result::Result<(), ::qentity::validator::ValidationErrors> {
                ::qentity::validator::Validate::validate(self)
            }
        }
    } else {
        quote! {}
    };

    Ok(quote! {
        impl #impl_generics ::qentity::PointType for #ident #ty_generics #where_clause {
            const POINT_TYPE: &'static str = #point_type;
        }

        impl #impl_generics ::qentity::PointModel for #ident #ty_generics #where_clause {
            fn id(&self) -> ::qentity::PointId {
                self.id
            }

            fn vector(&self) -> ::core::option::Option<&::qentity::VectorMap> {
                self.vector.as_ref()
            }

            fn set_vector(&mut self, vector: ::core::option::Option<::qentity::VectorMap>) {
                self.vector = vector;
            }

            #validate
        }
    })
}
