//! `#[record_entity]` gives a sea-orm model the columns every persisted record
//! shares (`id`, `created_at`, `updated_at`) and wires the model into the DAO
//! layer's bookkeeping traits.
//!
//! The attribute must be placed above `#[sea_orm::model]` so the injected
//! fields are visible to the sea-orm derives.

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{Field, Fields, ItemStruct, parse_macro_input, parse_quote};

const TRAITS_PATH: &str = "crate::db::dao::base_traits";

#[proc_macro_attribute]
pub fn record_entity(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new(Span::call_site(), "record_entity takes no arguments")
            .to_compile_error()
            .into();
    }

    let mut input = parse_macro_input!(item as ItemStruct);
    if let Err(err) = inject_record_fields(&mut input) {
        return err.to_compile_error().into();
    }

    let traits: syn::Path = match syn::parse_str(TRAITS_PATH) {
        Ok(path) => path,
        Err(err) => return err.to_compile_error().into(),
    };

    let expanded = quote! {
        #input

        impl #traits::HasIdActiveModel for ActiveModel {
            fn set_id(&mut self, id: uuid::Uuid) {
                self.id = sea_orm::ActiveValue::Set(id);
            }
        }

        impl #traits::TimestampedActiveModel for ActiveModel {
            fn set_created_at(&mut self, ts: sea_orm::entity::prelude::DateTimeWithTimeZone) {
                self.created_at = sea_orm::ActiveValue::Set(ts);
            }

            fn set_updated_at(&mut self, ts: sea_orm::entity::prelude::DateTimeWithTimeZone) {
                self.updated_at = sea_orm::ActiveValue::Set(ts);
            }
        }

        impl #traits::HasCreatedAtColumn for Entity {
            fn created_at_column() -> Column {
                Column::CreatedAt
            }
        }
    };

    expanded.into()
}

fn inject_record_fields(input: &mut ItemStruct) -> syn::Result<()> {
    let Fields::Named(fields) = &mut input.fields else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "record_entity requires a struct with named fields",
        ));
    };

    for reserved in ["id", "created_at", "updated_at"] {
        let clash = fields
            .named
            .iter()
            .filter_map(|field| field.ident.as_ref())
            .find(|ident| *ident == reserved);
        if let Some(ident) = clash {
            return Err(syn::Error::new_spanned(
                ident,
                format!("`{reserved}` is provided by record_entity"),
            ));
        }
    }

    let leading: [Field; 3] = [
        parse_quote! {
            #[sea_orm(primary_key, auto_increment = false)]
            pub id: uuid::Uuid
        },
        parse_quote! {
            #[sea_orm(default_expr = "Expr::current_timestamp()")]
            pub created_at: sea_orm::entity::prelude::DateTimeWithTimeZone
        },
        parse_quote! {
            #[sea_orm(default_expr = "Expr::current_timestamp()")]
            pub updated_at: sea_orm::entity::prelude::DateTimeWithTimeZone
        },
    ];

    let declared = std::mem::take(&mut fields.named);
    fields.named.extend(leading);
    fields.named.extend(declared);
    Ok(())
}
