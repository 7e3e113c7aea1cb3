//! HTTP 请求封装模块
//!
//! 使用 `web_sys::fetch` 实现核心库的 [`HttpClient`]，不引入 `gloo-net`。

use async_trait::async_trait;
use devboard::{GatewayError, HttpClient, HttpRequest, HttpResponse};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

fn transport(context: &str, err: JsValue) -> GatewayError {
    GatewayError::Transport(format!("{}: {:?}", context, err))
}

/// 基于浏览器 `fetch` 的传输层
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchHttpClient;

#[async_trait(?Send)]
impl HttpClient for FetchHttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, GatewayError> {
        let headers = Headers::new().map_err(|e| transport("创建 Headers 失败", e))?;
        for (key, value) in &req.headers {
            headers
                .set(key, value)
                .map_err(|e| transport("设置 Header 失败", e))?;
        }

        let opts = RequestInit::new();
        opts.set_method(req.method.as_str());
        opts.set_headers(&headers.into());
        if let Some(body) = &req.body {
            opts.set_body(&JsValue::from_str(body));
        }

        let request = Request::new_with_str_and_init(&req.url, &opts)
            .map_err(|e| transport("请求构建失败", e))?;

        let window = web_sys::window()
            .ok_or_else(|| GatewayError::Transport("无法获取 window 对象".to_string()))?;

        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| transport("网络错误", e))?;

        let response: Response = resp_value
            .dyn_into()
            .map_err(|e| transport("Response 类型转换失败", e))?;

        let status = response.status();
        let promise = response.text().map_err(|e| transport("读取响应失败", e))?;
        let text = JsFuture::from(promise)
            .await
            .map_err(|e| transport("读取响应失败", e))?;

        Ok(HttpResponse {
            status,
            body: text.as_string().unwrap_or_default(),
        })
    }
}
