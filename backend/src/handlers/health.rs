/// Liveness probe; no API key required.
pub async fn health() -> &'static str {
    "Health! Ok"
}
