mod bindings;

use proc_macro::TokenStream;

/// 派生 `ToValue`，使结构体可直接作为查询变量绑定使用。
///
/// 字段属性：
/// - `#[binding("name")]` / `#[binding(rename = "name")]`：自定义变量名
/// - `#[binding(ignore)]`：跳过该字段
#[proc_macro_derive(Bindings, attributes(binding))]
pub fn derive_bindings(input: TokenStream) -> TokenStream {
    bindings::derive_bindings_impl(input)
}
