use std::collections::HashSet;

use proc_macro::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr, Path};

/// Derive macro for record field discovery.
///
/// Generates a `fieldmap::record::Record` impl on the annotated struct:
///
/// - `schema()`: `'static` field table in declaration order.
/// - `get(&self, name)`: current value of a readable field.
/// - `set(&mut self, name, value)`: assigns a writable field.
///
/// Every field type must implement `fieldmap::record::FieldValue`.
///
/// # Example
///
/// ```ignore
/// #[derive(Record, Default)]
/// #[record(validate = User::is_complete)]
/// pub struct User {
///     #[field(read_only)]
///     pub id: i64,
///
///     #[field(rename = "userName")]
///     pub name: String,
///
///     #[field(skip)]
///     pub cache: Vec<u8>,
/// }
/// ```
///
/// Field attributes: `rename = "..."`, `skip`, `read_only`, `write_only`.
/// Container attribute: `validate = path::to::fn(&Self) -> bool`.
#[proc_macro_derive(Record, attributes(field, record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_record_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

/// Derive macro for field-less enums addressed by variant name.
///
/// Generates `fieldmap::record::NamedEnum` and `fieldmap::record::FieldValue`
/// impls; the enum travels through a field map as its variant name.
#[proc_macro_derive(NamedEnum)]
pub fn derive_named_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_named_enum_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn derive_record_impl(input: &DeriveInput) -> Result<proc_macro2::TokenStream, syn::Error> {
    let name = &input.ident;
    let name_str = name.unraw().to_string();

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record does not support generic types",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Record only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Record only supports structs",
            ))
        }
    };

    let validate = parse_container_attrs(input)?;

    let mut descriptor_tokens = Vec::new();
    let mut get_tokens = Vec::new();
    let mut set_tokens = Vec::new();
    let mut keys = HashSet::new();

    for field in fields {
        let field_name = field.ident.as_ref().ok_or_else(|| {
            syn::Error::new_spanned(field, "expected named field")
        })?;
        let field_ty = &field.ty;

        // Parse #[field(...)] attribute.
        let mut rename: Option<String> = None;
        let mut skip = false;
        let mut read_only = false;
        let mut write_only = false;

        for attr in &field.attrs {
            if !attr.path().is_ident("field") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let value: LitStr = meta.value()?.parse()?;
                    rename = Some(value.value());
                } else if meta.path.is_ident("skip") {
                    skip = true;
                } else if meta.path.is_ident("read_only") {
                    read_only = true;
                } else if meta.path.is_ident("write_only") {
                    write_only = true;
                } else {
                    return Err(meta.error("unknown field attribute (expected rename, skip, read_only or write_only)"));
                }
                Ok(())
            })?;
        }

        if skip {
            continue;
        }
        if read_only && write_only {
            return Err(syn::Error::new_spanned(
                field_name,
                "field cannot be both read_only and write_only",
            ));
        }

        let key = rename.unwrap_or_else(|| field_name.unraw().to_string());
        if !keys.insert(key.clone()) {
            return Err(syn::Error::new_spanned(
                field_name,
                format!("duplicate field key '{key}'"),
            ));
        }

        let access = if read_only {
            quote! { .read_only() }
        } else if write_only {
            quote! { .write_only() }
        } else {
            quote! {}
        };

        descriptor_tokens.push(quote! {
            fieldmap::schema::FieldDescriptor::new(
                #key,
                <#field_ty as fieldmap::record::FieldValue>::KIND,
                <#field_ty as fieldmap::record::FieldValue>::NULLABLE,
            ) #access
        });

        if !write_only {
            get_tokens.push(quote! {
                #key => Some(fieldmap::record::FieldValue::to_value(&self.#field_name)),
            });
        }
        if !read_only {
            set_tokens.push(quote! {
                #key => {
                    self.#field_name = fieldmap::record::FieldValue::from_value(__value)?;
                    Ok(())
                }
            });
        }
    }

    let is_valid = match validate {
        Some(path) => quote! {
            fn is_valid(&self) -> bool {
                #path(self)
            }
        },
        None => quote! {},
    };

    let expanded = quote! {
        impl fieldmap::record::Record for #name {
            fn schema() -> fieldmap::schema::Schema {
                static FIELDS: &[fieldmap::schema::FieldDescriptor] = &[
                    #(#descriptor_tokens),*
                ];
                fieldmap::schema::Schema {
                    type_name: #name_str,
                    fields: FIELDS,
                }
            }

            fn get(&self, __name: &str) -> Option<fieldmap::value::Value> {
                match __name {
                    #(#get_tokens)*
                    _ => None,
                }
            }

            #[allow(unused_variables)]
            fn set(
                &mut self,
                __name: &str,
                __value: fieldmap::value::Value,
            ) -> fieldmap::error::Result<()> {
                match __name {
                    #(#set_tokens)*
                    _ => Err(fieldmap::error::Error::invalid_argument(format!(
                        "{} has no writable field '{}'",
                        #name_str, __name
                    ))),
                }
            }

            #is_valid
        }
    };

    Ok(expanded)
}

/// Parse `#[record(validate = path)]`.
fn parse_container_attrs(input: &DeriveInput) -> Result<Option<Path>, syn::Error> {
    let mut validate: Option<Path> = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("record") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("validate") {
                validate = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("unknown record attribute (expected validate)"))
            }
        })?;
    }
    Ok(validate)
}

fn derive_named_enum_impl(input: &DeriveInput) -> Result<proc_macro2::TokenStream, syn::Error> {
    let name = &input.ident;
    let name_str = name.unraw().to_string();

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "NamedEnum does not support generic types",
        ));
    }

    let variants = match &input.data {
        Data::Enum(data) => &data.variants,
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "NamedEnum only supports enums",
            ))
        }
    };

    let mut idents = Vec::new();
    let mut names = Vec::new();
    for variant in variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "NamedEnum only supports unit variants",
            ));
        }
        idents.push(&variant.ident);
        names.push(variant.ident.unraw().to_string());
    }

    let expanded = quote! {
        impl fieldmap::record::NamedEnum for #name {
            const NAME: &'static str = #name_str;
            const VARIANTS: &'static [Self] = &[#(Self::#idents),*];
            const NAMES: &'static [&'static str] = &[#(#names),*];

            fn name(&self) -> &'static str {
                match *self {
                    #(Self::#idents => #names,)*
                }
            }
        }

        impl fieldmap::record::FieldValue for #name {
            const KIND: fieldmap::value::ValueKind =
                fieldmap::value::ValueKind::Enum(fieldmap::value::EnumKind {
                    name: #name_str,
                    variants: <Self as fieldmap::record::NamedEnum>::NAMES,
                });

            fn to_value(&self) -> fieldmap::value::Value {
                fieldmap::value::Value::Str(
                    fieldmap::record::NamedEnum::name(self).to_string(),
                )
            }

            fn from_value(
                __value: fieldmap::value::Value,
            ) -> fieldmap::error::Result<Self> {
                match __value {
                    fieldmap::value::Value::Str(__s) => match __s.as_str() {
                        #(#names => Ok(Self::#idents),)*
                        _ => Err(fieldmap::error::Error::conversion(format!(
                            "'{}' is not a variant of {}",
                            __s, #name_str
                        ))),
                    },
                    __other => Err(fieldmap::error::Error::conversion(format!(
                        "expected {}, got {}",
                        <Self as fieldmap::record::FieldValue>::KIND,
                        __other.kind()
                    ))),
                }
            }
        }
    };

    Ok(expanded)
}
