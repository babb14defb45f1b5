use reqwest::ClientBuilder;

fn has_proxy_env() -> bool {
    [
        "HTTPS_PROXY",
        "https_proxy",
        "HTTP_PROXY",
        "http_proxy",
        "ALL_PROXY",
        "all_proxy",
    ]
    .iter()
    .any(|k| std::env::var(k).is_ok_and(|v| !v.trim().is_empty()))
}

fn proxy_allowed_by_env() -> bool {
    std::env::var("COZE_RELAY_ALLOW_PROXY")
        .is_ok_and(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "yes" | "YES"))
}

fn should_bypass_proxy_impl(url: &str, proxy_env_present: bool, proxy_allowed: bool) -> bool {
    if !proxy_env_present || proxy_allowed {
        return false;
    }

    let Ok(u) = reqwest::Url::parse(url) else {
        return false;
    };
    let Some(host) = u.host_str() else {
        return false;
    };

    // 国内站与本机直连
    host == "coze.cn"
        || host.ends_with(".coze.cn")
        || matches!(host, "localhost" | "127.0.0.1" | "[::1]" | "::1")
}

pub fn should_bypass_proxy_for_url(url: &str) -> bool {
    should_bypass_proxy_impl(url, has_proxy_env(), proxy_allowed_by_env())
}

pub fn maybe_disable_proxy(builder: ClientBuilder, url: &str) -> ClientBuilder {
    if should_bypass_proxy_for_url(url) {
        builder.no_proxy()
    } else {
        builder
    }
}

/// 不设置超时，沿用传输层默认行为
pub fn client_for_url(url: &str) -> Result<reqwest::Client, reqwest::Error> {
    let builder = reqwest::Client::builder();
    maybe_disable_proxy(builder, url).build()
}
