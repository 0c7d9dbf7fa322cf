//! Elasticsearch request and response shapes for the DNS log search.

use serde::{Deserialize, Serialize};

pub const DEFAULT_INDEX_PATTERN: &str = "logs-cph-bind9*";

const SOURCE_FIELDS: [&str; 4] = ["@timestamp", "client.ip", "destination.address", "message"];

/// Body of a `_search` request: exact client IP, wildcard destination.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchRequest {
    query: Query,
    #[serde(rename = "_source")]
    source: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u32>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
struct Query {
    bool: BoolQuery,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
struct BoolQuery {
    must: Vec<Clause>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
enum Clause {
    Term {
        #[serde(rename = "client.ip")]
        client_ip: String,
    },
    Wildcard {
        #[serde(rename = "destination.address")]
        destination_address: String,
    },
}

impl SearchRequest {
    pub fn for_domain(client_ip: &str, domain: &str, size: Option<u32>) -> Self {
        Self {
            query: Query {
                bool: BoolQuery {
                    must: vec![
                        Clause::Term {
                            client_ip: client_ip.to_string(),
                        },
                        Clause::Wildcard {
                            destination_address: wildcard_pattern(domain),
                        },
                    ],
                },
            },
            source: SOURCE_FIELDS.to_vec(),
            size,
        }
    }
}

/// `*domain*`, the substring match on the destination address.
pub fn wildcard_pattern(domain: &str) -> String {
    format!("*{domain}*")
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: HitsEnvelope,
}

/// Hits stay undecoded here so one bad record cannot sink the others.
#[derive(Debug, Default, Deserialize)]
pub struct HitsEnvelope {
    #[serde(default)]
    pub hits: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_source")]
    source: HitSource,
}

#[derive(Debug, Deserialize)]
struct HitSource {
    #[serde(rename = "@timestamp")]
    timestamp: String,
    message: String,
}

/// One matching log record, tied to the domain that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub domain: String,
    pub timestamp: String,
    pub message: String,
}

/// A hit that came back without a usable `@timestamp` or `message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedHit {
    /// Position in the response's hit list.
    pub position: usize,
    pub reason: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DecodedHits {
    pub hits: Vec<Hit>,
    pub rejected: Vec<RejectedHit>,
}

impl SearchResponse {
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    pub fn into_hits(self, domain: &str) -> DecodedHits {
        let mut decoded = DecodedHits::default();

        for (position, value) in self.hits.hits.into_iter().enumerate() {
            match serde_json::from_value::<RawHit>(value) {
                Ok(raw) => decoded.hits.push(Hit {
                    domain: domain.to_string(),
                    timestamp: raw.source.timestamp,
                    message: raw.source.message,
                }),
                Err(e) => decoded.rejected.push(RejectedHit {
                    position,
                    reason: e.to_string(),
                }),
            }
        }

        decoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_matches_elastic_bool_query() {
        let request = SearchRequest::for_domain("10.0.0.7", "example.com", None);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "query": {
                    "bool": {
                        "must": [
                            {"term": {"client.ip": "10.0.0.7"}},
                            {"wildcard": {"destination.address": "*example.com*"}}
                        ]
                    }
                },
                "_source": ["@timestamp", "client.ip", "destination.address", "message"]
            })
        );
    }

    #[test]
    fn size_is_sent_only_when_set() {
        let request = SearchRequest::for_domain("10.0.0.7", "example.com", Some(500));
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["size"], json!(500));
    }

    #[test]
    fn empty_domain_matches_everything() {
        assert_eq!(wildcard_pattern(""), "**");
    }

    #[test]
    fn parses_hits_with_extra_fields() {
        let body = json!({
            "took": 3,
            "hits": {
                "total": {"value": 1, "relation": "eq"},
                "hits": [{
                    "_index": "logs-cph-bind9-2024.01.01",
                    "_source": {
                        "@timestamp": "2024-01-01T00:00:00Z",
                        "client": {"ip": "10.0.0.7"},
                        "destination": {"address": "www.example.com"},
                        "message": "query: www.example.com IN A +"
                    }
                }]
            }
        })
        .to_string();

        let decoded = SearchResponse::parse(&body).unwrap().into_hits("example.com");
        assert!(decoded.rejected.is_empty());
        assert_eq!(
            decoded.hits,
            vec![Hit {
                domain: "example.com".to_string(),
                timestamp: "2024-01-01T00:00:00Z".to_string(),
                message: "query: www.example.com IN A +".to_string(),
            }]
        );
    }

    #[test]
    fn missing_hits_section_is_empty() {
        let decoded = SearchResponse::parse("{}").unwrap().into_hits("example.com");
        assert_eq!(decoded, DecodedHits::default());
    }

    #[test]
    fn incomplete_hit_is_rejected_without_losing_the_rest() {
        let body = json!({
            "hits": {
                "hits": [
                    {"_source": {"@timestamp": "2024-01-01T00:00:00Z", "message": "ok"}},
                    {"_source": {"@timestamp": "2024-01-01T00:00:01Z"}},
                    {"_source": {"message": "no time"}},
                    {"_source": {"@timestamp": "2024-01-01T00:00:03Z", "message": "also ok"}}
                ]
            }
        })
        .to_string();

        let decoded = SearchResponse::parse(&body).unwrap().into_hits("example.com");

        let stamps: Vec<&str> = decoded.hits.iter().map(|h| h.timestamp.as_str()).collect();
        assert_eq!(stamps, vec!["2024-01-01T00:00:00Z", "2024-01-01T00:00:03Z"]);
        let positions: Vec<usize> = decoded.rejected.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![1, 2]);
        assert!(decoded.rejected[0].reason.contains("message"));
    }

    #[test]
    fn non_json_body_fails_to_parse() {
        assert!(SearchResponse::parse("<html>proxy error</html>").is_err());
    }
}
