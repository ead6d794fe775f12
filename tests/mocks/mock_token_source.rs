use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use swap_cache::domain::TokenAddress;
use swap_cache::error::{FetchError, FetchResult};
use swap_cache::models::TokenMetadata;
use swap_cache::sources::TokenMetadataSource;

/// Mock ERC-20 metadata reader for testing.
#[allow(dead_code)]
#[derive(Clone)]
pub struct MockTokenSource {
    tokens: Arc<Mutex<HashMap<TokenAddress, TokenMetadata>>>,
    call_counts: Arc<Mutex<HashMap<String, usize>>>,
}

#[allow(dead_code)]
impl MockTokenSource {
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(Mutex::new(HashMap::new())),
            call_counts: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn add_token(&self, address: TokenAddress, symbol: &str, decimals: u8) {
        let mut tokens = self.tokens.lock().unwrap();
        tokens.insert(
            address,
            TokenMetadata {
                symbol: symbol.to_string(),
                name: format!("{} Token", symbol),
                decimals,
            },
        );
    }

    pub fn get_call_count(&self, address: &TokenAddress) -> usize {
        let counts = self.call_counts.lock().unwrap();
        *counts.get(address.as_str()).unwrap_or(&0)
    }

    fn track_call(&self, address: &TokenAddress) {
        let mut counts = self.call_counts.lock().unwrap();
        *counts.entry(address.as_str().to_string()).or_insert(0) += 1;
    }
}

impl Default for MockTokenSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenMetadataSource for MockTokenSource {
    async fn fetch_metadata(&self, token: &TokenAddress) -> FetchResult<TokenMetadata> {
        self.track_call(token);

        let tokens = self.tokens.lock().unwrap();
        tokens
            .get(token)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(format!("token {}", token)))
    }
}
