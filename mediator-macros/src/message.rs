use crate::utils::{ensure_metadata_field, merge_message_derives};
use proc_macro::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{
    Fields, Ident, Item, Result, Token, Type, parse::Parse, parse::ParseStream, parse_macro_input,
};

#[derive(Clone, Copy)]
pub(crate) enum MessageKind {
    Command,
    Event,
}

impl MessageKind {
    fn attr_name(self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Event => "event",
        }
    }
}

/// #[command] / #[event] 宏实现
pub(crate) fn expand(kind: MessageKind, attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as MessageAttrConfig);
    let input = parse_macro_input!(item as Item);

    let mut st = match input {
        Item::Struct(s) => s,
        other => {
            let msg = format!("#[{}] only on struct", kind.attr_name());
            return syn::Error::new(other.span(), msg).to_compile_error().into();
        }
    };

    if let (MessageKind::Event, Some(ty)) = (kind, &cfg.result) {
        return syn::Error::new(ty.span(), "#[event] does not accept 'result'; events have no result")
            .to_compile_error()
            .into();
    }

    // 单元结构体转为空的具名字段结构体，以便注入 metadata
    if matches!(st.fields, Fields::Unit) {
        st.fields = Fields::Named(syn::parse_quote!({}));
        st.semi_token = None;
    }

    let struct_span = st.span();
    let metadata_ty: Type = syn::parse_quote! { ::mediator_abstractions::MessageMetadata };
    match &mut st.fields {
        Fields::Named(fields_named) => {
            ensure_metadata_field(fields_named, &metadata_ty);
        }
        _ => {
            let msg = format!(
                "#[{}] supports only named-field or unit struct, e.g., struct X {{ a: T }}",
                kind.attr_name()
            );
            return syn::Error::new(struct_span, msg).to_compile_error().into();
        }
    }

    merge_message_derives(&mut st.attrs);

    // 构造函数参数：除 metadata 外的全部字段，保持声明顺序
    let (arg_idents, arg_types): (Vec<&Ident>, Vec<&Type>) = st
        .fields
        .iter()
        .filter_map(|f| {
            let ident = f.ident.as_ref()?;
            (ident != "metadata").then_some((ident, &f.ty))
        })
        .unzip();

    let ident = &st.ident;
    let vis = &st.vis;
    let (impl_generics, ty_generics, where_clause) = st.generics.split_for_impl();

    let kind_impl = match (kind, &cfg.result) {
        (MessageKind::Command, Some(result_ty)) => quote! {
            impl #impl_generics ::mediator_abstractions::CommandWithResult for #ident #ty_generics #where_clause {
                type Result = #result_ty;
            }
        },
        (MessageKind::Command, None) => quote! {
            impl #impl_generics ::mediator_abstractions::Command for #ident #ty_generics #where_clause {}
        },
        (MessageKind::Event, _) => quote! {
            impl #impl_generics ::mediator_abstractions::Event for #ident #ty_generics #where_clause {}
        },
    };

    let out = quote! {
        #st

        #[allow(dead_code)]
        impl #impl_generics #ident #ty_generics #where_clause {
            #[allow(clippy::too_many_arguments)]
            #vis fn new(#( #arg_idents: #arg_types ),*) -> Self {
                Self {
                    #( #arg_idents, )*
                    metadata: ::mediator_abstractions::MessageMetadata::new(),
                }
            }

            #vis fn with_metadata(mut self, metadata: ::mediator_abstractions::MessageMetadata) -> Self {
                self.metadata = metadata;
                self
            }
        }

        impl #impl_generics ::mediator_abstractions::Message for #ident #ty_generics #where_clause {
            fn metadata(&self) -> &::mediator_abstractions::MessageMetadata {
                &self.metadata
            }
        }

        #kind_impl
    };

    TokenStream::from(out)
}

// -------- parsing --------

// 宏参数：`result = Type`
struct MessageAttrConfig {
    result: Option<Type>,
}

impl Parse for MessageAttrConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut result: Option<Type> = None;

        while !input.is_empty() {
            let key: Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            match key.to_string().as_str() {
                "result" => {
                    if result.is_some() {
                        return Err(syn::Error::new(
                            key.span(),
                            "duplicate key 'result' in attribute",
                        ));
                    }
                    result = Some(input.parse()?);
                }
                _ => {
                    return Err(syn::Error::new(
                        key.span(),
                        "unknown key; expected 'result'",
                    ));
                }
            }

            if input.is_empty() {
                break;
            }
            input.parse::<Token![,]>()?;
        }

        Ok(Self { result })
    }
}
