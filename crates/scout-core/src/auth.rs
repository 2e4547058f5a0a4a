// SPDX-License-Identifier: Apache-2.0

//! Token provider abstraction for credential resolution.
//!
//! The core library never reads credentials itself. Front ends implement
//! [`TokenProvider`] and hand it to the facade.

use secrecy::SecretString;

/// Provides GitHub credentials for API calls.
///
/// Implementations should return `None` if no credential is available.
pub trait TokenProvider: Send + Sync {
    /// Retrieves the GitHub API token.
    ///
    /// Returns `None` if no token is available from any source.
    fn github_token(&self) -> Option<SecretString>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    struct MockTokenProvider {
        github_token: Option<SecretString>,
    }

    impl TokenProvider for MockTokenProvider {
        fn github_token(&self) -> Option<SecretString> {
            self.github_token.clone()
        }
    }

    #[test]
    fn test_mock_provider_with_token() {
        let provider = MockTokenProvider {
            github_token: Some(SecretString::new("gh_token".to_string().into())),
        };
        assert_eq!(
            provider.github_token().unwrap().expose_secret(),
            "gh_token"
        );
    }

    #[test]
    fn test_mock_provider_without_token() {
        let provider = MockTokenProvider { github_token: None };
        assert!(provider.github_token().is_none());
    }
}
