use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};

/// Deletes every cached response from `$TRENDS_HOME/.cache`.
pub async fn cache_clear(config: &Config) -> Result<Out<usize>> {
    let cache = config.cache();
    if !cache.is_enabled() {
        return Ok(Out::new("Caching is disabled, there is nothing to clear", 0));
    }
    let removed = cache.clear().await.pub_result(ErrorType::Cache)?;
    Ok(Out::new(
        format!("Removed {removed} cached response(s)"),
        removed,
    ))
}
