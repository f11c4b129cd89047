use alloy_primitives::{hex, U256};
use claim_core::SdkError;
use serde::de::DeserializeOwned;

pub const DEFAULT_IPFS_GATEWAY: &str = "https://ipfs.io/ipfs/";

/// Turns `ipfs://` URIs into gateway URLs and fills the ERC1155 `{id}`
/// placeholder with the zero-padded hex token id.
pub fn resolve_uri(uri: &str, token_id: Option<U256>, gateway: &str) -> String {
    let uri = match token_id {
        Some(id) => uri.replace("{id}", &hex::encode(id.to_be_bytes::<32>())),
        None => uri.to_string(),
    };
    match uri.strip_prefix("ipfs://") {
        Some(path) => format!("{gateway}{}", path.trim_start_matches("ipfs/")),
        None => uri,
    }
}

/// Fetches and parses a metadata document. Inline `data:application/json`
/// URIs are parsed without a request.
pub fn fetch_json<T: DeserializeOwned>(url: &str) -> Result<T, SdkError> {
    let body = if let Some(inline) = inline_json(url) {
        inline.to_string()
    } else if url.starts_with("http://") || url.starts_with("https://") {
        ureq::get(url)
            .call()
            .map_err(|e| SdkError::Metadata(format!("failed to fetch {url}: {e}")))?
            .into_body()
            .read_to_string()
            .map_err(|e| SdkError::Metadata(format!("failed to read {url}: {e}")))?
    } else {
        return Err(SdkError::Metadata(format!("unsupported metadata uri: {url}")));
    };
    serde_json::from_str(&body).map_err(|e| SdkError::Metadata(format!("invalid metadata at {url}: {e}")))
}

fn inline_json(uri: &str) -> Option<&str> {
    uri.strip_prefix("data:application/json,")
        .or_else(|| uri.strip_prefix("data:application/json;utf8,"))
}

#[cfg(test)]
mod tests {
    use claim_core::types::ContractMetadata;

    use super::*;

    #[test]
    fn test_resolve_ipfs() {
        assert_eq!(
            resolve_uri("ipfs://QmHash/0", None, DEFAULT_IPFS_GATEWAY),
            "https://ipfs.io/ipfs/QmHash/0"
        );
        assert_eq!(
            resolve_uri("ipfs://ipfs/QmHash", None, DEFAULT_IPFS_GATEWAY),
            "https://ipfs.io/ipfs/QmHash"
        );
        assert_eq!(
            resolve_uri("https://meta.example/c.json", None, DEFAULT_IPFS_GATEWAY),
            "https://meta.example/c.json"
        );
    }

    #[test]
    fn test_resolve_id_placeholder() {
        let uri = resolve_uri("ipfs://QmHash/{id}.json", Some(U256::from(10u64)), DEFAULT_IPFS_GATEWAY);
        assert_eq!(
            uri,
            format!("https://ipfs.io/ipfs/QmHash/{}a.json", "0".repeat(63))
        );
    }

    #[test]
    fn test_inline_metadata() {
        let meta: ContractMetadata =
            fetch_json(r#"data:application/json,{"name":"Inline","image":"ipfs://img"}"#).unwrap();
        assert_eq!(meta.name, "Inline");
        assert_eq!(meta.image.as_deref(), Some("ipfs://img"));
    }

    #[test]
    fn test_unsupported_scheme() {
        let err = fetch_json::<ContractMetadata>("ar://tx").unwrap_err();
        assert!(matches!(err, SdkError::Metadata(_)));
    }
}
