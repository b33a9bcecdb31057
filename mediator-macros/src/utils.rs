use proc_macro2::Span;
use syn::{Attribute, Field, FieldsNamed, Ident, Path, Token, Type, punctuated::Punctuated};

/// 消息类型必须具备的派生
const MESSAGE_DERIVES: [&str; 2] = ["Debug", "Clone"];

/// 合并全部 `#[derive(..)]` 为一个，并补齐消息必需的派生
///
/// 以末段标识符判重，`Debug` 与 `std::fmt::Debug` 视为同一个派生。
/// 无法解析的 derive 属性原样保留，交给编译器报错。
pub(crate) fn merge_message_derives(attrs: &mut Vec<Attribute>) {
    let mut derives: Vec<Path> = MESSAGE_DERIVES
        .iter()
        .map(|name| Path::from(Ident::new(name, Span::call_site())))
        .collect();
    let mut others = Vec::with_capacity(attrs.len());

    for attr in attrs.drain(..) {
        if !attr.path().is_ident("derive") {
            others.push(attr);
            continue;
        }
        let Ok(listed) = attr.parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated)
        else {
            others.push(attr);
            continue;
        };
        for path in listed {
            if !derives.iter().any(|known| same_derive(known, &path)) {
                derives.push(path);
            }
        }
    }

    attrs.push(syn::parse_quote!(#[derive(#(#derives),*)]));
    attrs.extend(others);
}

fn same_derive(a: &Path, b: &Path) -> bool {
    match (a.segments.last(), b.segments.last()) {
        (Some(a), Some(b)) => a.ident == b.ident,
        _ => false,
    }
}

// 缺失时把 metadata 插入为第一个字段
pub(crate) fn ensure_metadata_field(fields: &mut FieldsNamed, ty: &Type) {
    let present = fields
        .named
        .iter()
        .any(|f| f.ident.as_ref().is_some_and(|ident| ident == "metadata"));
    if !present {
        let field: Field = syn::parse_quote!(metadata: #ty);
        fields.named.insert(0, field);
    }
}
