use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{DeriveInput, LitStr, parse_macro_input};

pub fn derive_bindings_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match input.data {
        syn::Data::Struct(data) => match data.fields {
            syn::Fields::Named(fields) => fields.named,
            _ => {
                return syn::Error::new_spanned(
                    name,
                    "Bindings only supports structs with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new_spanned(name, "Bindings only supports structs")
                .to_compile_error()
                .into();
        }
    };

    let mut inserts = Vec::new();
    for f in fields.iter() {
        let Some(field_name) = f.ident.as_ref() else {
            continue;
        };
        let (key, ignore) = match parse_field_attrs(f) {
            Ok(attrs) => attrs,
            Err(e) => return e.to_compile_error().into(),
        };
        if ignore {
            continue;
        }

        // 同时登记 camelCase 别名，查询变量 `:minAge` 可直接匹配字段 `min_age`
        let key_lit = LitStr::new(&key, Span::call_site());
        let camel = snake_to_camel(&key);
        let alias = (camel != key).then(|| {
            let camel_lit = LitStr::new(&camel, Span::call_site());
            quote! {
                map.entry(#camel_lit.to_string()).or_insert_with(|| value.clone());
            }
        });
        inserts.push(quote! {
            {
                let value = ::uquery::value::ToValue::to_value(&self.#field_name);
                #alias
                map.insert(#key_lit.to_string(), value);
            }
        });
    }

    TokenStream::from(quote! {
        impl #impl_generics ::uquery::value::ToValue for #name #ty_generics #where_clause {
            fn to_value(&self) -> ::uquery::value::Value {
                let mut map = ::std::collections::HashMap::new();
                #(#inserts)*
                ::uquery::value::Value::Map(map)
            }
        }
    })
}

// 字段属性：#[binding("name")]、#[binding(rename = "name")]、#[binding(ignore)]
fn parse_field_attrs(field: &syn::Field) -> syn::Result<(String, bool)> {
    let mut name = field
        .ident
        .as_ref()
        .map(|i| i.to_string().trim_start_matches("r#").to_string())
        .unwrap_or_default();
    let mut ignore = false;

    for attr in &field.attrs {
        if !attr.path().is_ident("binding") {
            continue;
        }
        if let Ok(s) = attr.parse_args::<LitStr>() {
            name = s.value();
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("ignore") {
                ignore = true;
                Ok(())
            } else if meta.path.is_ident("rename") {
                let s: LitStr = meta.value()?.parse()?;
                name = s.value();
                Ok(())
            } else {
                Err(meta.error("expected `ignore` or `rename = \"...\"`"))
            }
        })?;
    }
    Ok((name, ignore))
}

fn snake_to_camel(s: &str) -> String {
    let mut out = String::new();
    let mut parts = s.split('_').filter(|p| !p.is_empty());
    if let Some(first) = parts.next() {
        out.push_str(first);
    }
    for part in parts {
        let mut chars = part.chars();
        if let Some(c0) = chars.next() {
            out.extend(c0.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
