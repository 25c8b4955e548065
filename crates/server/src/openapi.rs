use utoipa::{OpenApi, ToSchema};

#[derive(ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Service description as exchanged on `/info` and `/setinfo`.
/// `release_time` uses `%Y-%m-%dT%H:%M:%SZ`; `tags` is a list on input and a
/// space-joined string on output.
#[derive(ToSchema)]
pub struct InfoDoc {
    pub name: String,
    pub synopsis: String,
    pub version: String,
    pub institution: String,
    #[schema(example = "2013-03-18T00:00:00Z")]
    pub release_time: String,
    pub support_email: Option<String>,
    pub category: Option<String>,
    pub research_subject: Option<String>,
    pub tags: String,
}

#[derive(ToSchema)]
pub struct StatisticDoc {
    #[schema(example = "invocations")]
    pub name: String,
    #[schema(example = "42")]
    pub value: String,
    pub last_reset: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::api::info,
        crate::routes::api::stats,
        crate::routes::api::add,
        crate::routes::api::reset,
        crate::routes::api::set_info,
    ),
    components(schemas(HealthResponse, InfoDoc, StatisticDoc)),
    tags(
        (name = "health"),
        (name = "service"),
        (name = "counter")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_json_endpoints() {
        let doc = ApiDoc::openapi();
        for path in ["/health", "/info", "/stats", "/add", "/reset", "/setinfo"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
