//! Compact transport form of [`TenantConfiguration`].
//!
//! Layout: one version byte followed by the postcard payload, the whole
//! buffer base64 (standard alphabet) encoded for use as a header value.

use axum::http::{HeaderMap, HeaderValue};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use super::TenantConfiguration;
use crate::errors::ServiceError;

/// Header carrying the encoded configuration from edge to backend.
pub const TENANT_CONFIG_HEADER: &str = "x-gatekeep-app-config";

pub const TENANT_CONFIG_BIN_VERSION: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("tenant configuration header missing")]
    MissingHeader,
    #[error("tenant configuration header is not visible ASCII")]
    NotText,
    #[error("invalid base64: {0}")]
    Base64(String),
    #[error("empty payload")]
    Empty,
    #[error("unsupported tenant config version {0}")]
    UnsupportedVersion(u8),
    #[error("malformed payload: {0}")]
    Malformed(String),
    #[error("{0} trailing bytes after payload")]
    TrailingBytes(usize),
}

pub fn encode_bin(config: &TenantConfiguration) -> Result<Vec<u8>, ServiceError> {
    let payload = postcard::to_allocvec(config).map_err(|e| ServiceError::Encoding(e.to_string()))?;
    let mut out = Vec::with_capacity(payload.len() + 1);
    out.push(TENANT_CONFIG_BIN_VERSION);
    out.extend_from_slice(&payload);
    Ok(out)
}

pub fn decode_bin(bytes: &[u8]) -> Result<TenantConfiguration, DecodeError> {
    let (&version, payload) = bytes.split_first().ok_or(DecodeError::Empty)?;
    if version != TENANT_CONFIG_BIN_VERSION {
        return Err(DecodeError::UnsupportedVersion(version));
    }
    let (config, rest) = postcard::take_from_bytes::<TenantConfiguration>(payload)
        .map_err(|e| DecodeError::Malformed(e.to_string()))?;
    if !rest.is_empty() {
        return Err(DecodeError::TrailingBytes(rest.len()));
    }
    Ok(config)
}

pub fn encode(config: &TenantConfiguration) -> Result<String, ServiceError> {
    Ok(STANDARD.encode(encode_bin(config)?))
}

pub fn decode(text: &str) -> Result<TenantConfiguration, DecodeError> {
    let bytes = STANDARD
        .decode(text.trim())
        .map_err(|e| DecodeError::Base64(e.to_string()))?;
    decode_bin(&bytes)
}

/// Replace any existing value of the header with the encoded `config`.
pub fn set_tenant_config(headers: &mut HeaderMap, config: &TenantConfiguration) -> Result<(), ServiceError> {
    let value = HeaderValue::from_str(&encode(config)?).map_err(|e| ServiceError::Encoding(e.to_string()))?;
    headers.insert(TENANT_CONFIG_HEADER, value);
    Ok(())
}

pub fn tenant_config_from_headers(headers: &HeaderMap) -> Result<TenantConfiguration, DecodeError> {
    let raw = headers.get(TENANT_CONFIG_HEADER).ok_or(DecodeError::MissingHeader)?;
    let text = raw.to_str().map_err(|_| DecodeError::NotText)?;
    decode(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenant_config::{SsoConfiguration, UserAuditConfiguration};
    use proptest::prelude::*;
    use uuid::Uuid;

    fn full_config() -> TenantConfiguration {
        let mut c = TenantConfiguration {
            tenant_id: Uuid::new_v4(),
            db_connection_str: "postgres://u:p@db/app".into(),
            api_key: "api-key".into(),
            master_key: "master-key".into(),
            app_name: "demo".into(),
            cors_host: "*".into(),
            sso_providers: vec!["google".into(), "github".into()],
            sso_configs: vec![SsoConfiguration {
                name: "google".into(),
                client_id: "cid".into(),
                client_secret: "csecret".into(),
                scope: "openid email".into(),
            }],
            auth_record_keys: vec![vec!["username".into()], vec!["email".into()]],
            user_audit: UserAuditConfiguration {
                enabled: true,
                pw_min_length: 8,
                pw_excluded_keywords: vec!["secret".into(), "ünïcode\n\u{0}".into()],
                pw_history_size: -1,
                ..Default::default()
            },
            ..Default::default()
        };
        c.token_store.secret = "token-secret".into();
        c.token_store.expiry = i64::MAX;
        c.user_verify.keys = vec!["email".into()];
        c
    }

    #[test]
    fn round_trips_full_and_default_configs() -> anyhow::Result<()> {
        for c in [full_config(), TenantConfiguration::default()] {
            let text = encode(&c)?;
            let back = decode(&text)?;
            assert_eq!(back, c);
            // byte-for-byte stable
            assert_eq!(encode(&back)?, text);
        }
        Ok(())
    }

    #[test]
    fn encoded_value_is_header_safe() -> anyhow::Result<()> {
        let text = encode(&full_config())?;
        assert!(text.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'='));
        Ok(())
    }

    #[test]
    fn decode_rejects_unknown_version() -> anyhow::Result<()> {
        let mut bin = encode_bin(&full_config())?;
        bin[0] = TENANT_CONFIG_BIN_VERSION.wrapping_add(1);
        let err = decode(&STANDARD.encode(&bin)).unwrap_err();
        assert_eq!(err, DecodeError::UnsupportedVersion(TENANT_CONFIG_BIN_VERSION + 1));
        Ok(())
    }

    #[test]
    fn decode_rejects_truncated_and_garbage_input() -> anyhow::Result<()> {
        let bin = encode_bin(&full_config())?;
        let truncated = STANDARD.encode(&bin[..bin.len() / 2]);
        assert!(matches!(decode(&truncated), Err(DecodeError::Malformed(_))));

        let mut padded = bin.clone();
        padded.push(0);
        assert_eq!(decode(&STANDARD.encode(&padded)), Err(DecodeError::TrailingBytes(1)));

        assert!(matches!(decode("%%%not base64%%%"), Err(DecodeError::Base64(_))));
        assert_eq!(decode(""), Err(DecodeError::Empty));
        Ok(())
    }

    #[test]
    fn header_helpers_round_trip_and_report_missing() -> anyhow::Result<()> {
        let mut headers = HeaderMap::new();
        assert_eq!(tenant_config_from_headers(&headers), Err(DecodeError::MissingHeader));

        headers.insert(TENANT_CONFIG_HEADER, HeaderValue::from_static("forged"));
        let c = full_config();
        set_tenant_config(&mut headers, &c)?;
        assert_eq!(headers.get_all(TENANT_CONFIG_HEADER).iter().count(), 1);
        assert_eq!(tenant_config_from_headers(&headers)?, c);
        Ok(())
    }

    // Any char, control and non-ASCII included.
    fn text() -> impl Strategy<Value = String> {
        prop::collection::vec(any::<char>(), 0..12).prop_map(|cs| cs.into_iter().collect())
    }

    fn texts() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(text(), 0..4)
    }

    fn sso_config() -> impl Strategy<Value = SsoConfiguration> {
        (text(), text(), text(), text()).prop_map(|(name, client_id, client_secret, scope)| SsoConfiguration {
            name,
            client_id,
            client_secret,
            scope,
        })
    }

    fn audit() -> impl Strategy<Value = UserAuditConfiguration> {
        (any::<[bool; 5]>(), text(), any::<[i32; 5]>(), texts(), texts()).prop_map(|(b, url, n, keywords, fields)| {
            UserAuditConfiguration {
                enabled: b[0],
                trail_handler_url: url,
                pw_min_length: n[0],
                pw_uppercase_required: b[1],
                pw_lowercase_required: b[2],
                pw_digit_required: b[3],
                pw_symbol_required: b[4],
                pw_min_guessable_level: n[1],
                pw_excluded_keywords: keywords,
                pw_excluded_fields: fields,
                pw_history_size: n[2],
                pw_history_days: n[3],
                pw_expiry_days: n[4],
            }
        })
    }

    fn config() -> impl Strategy<Value = TenantConfiguration> {
        let head = (any::<u128>(), text(), text(), text(), text(), text());
        let stores = (text(), any::<i64>(), text(), text(), audit());
        let mail = (text(), any::<i32>(), text(), text(), text(), any::<bool>(), prop::collection::vec(text(), 7));
        let sso = (text(), text(), text(), texts(), texts(), texts(), prop::collection::vec(sso_config(), 0..3));
        let keys = (prop::collection::vec(texts(), 0..4), texts());
        (head, stores, mail, sso, keys).prop_map(|(head, stores, mail, sso, keys)| {
            let mut c = TenantConfiguration {
                tenant_id: Uuid::from_u128(head.0),
                db_connection_str: head.1,
                api_key: head.2,
                master_key: head.3,
                app_name: head.4,
                cors_host: head.5,
                user_audit: stores.4,
                sso_providers: sso.5,
                sso_configs: sso.6,
                auth_record_keys: keys.0,
                ..Default::default()
            };
            c.token_store.secret = stores.0;
            c.token_store.expiry = stores.1;
            c.user_profile.impl_name = stores.2;
            c.user_profile.impl_store_url = stores.3;
            c.smtp.host = mail.0;
            c.smtp.port = mail.1;
            c.smtp.mode = mail.2;
            c.smtp.login = mail.3;
            c.smtp.password = mail.4;
            let [sender_name, sender, subject, reply_to_name, reply_to, text_url, html_url]: [String; 7] =
                mail.6.try_into().unwrap_or_default();
            c.welcome_email.enabled = mail.5;
            c.welcome_email.sender_name = sender_name;
            c.welcome_email.sender = sender;
            c.welcome_email.subject = subject;
            c.welcome_email.reply_to_name = reply_to_name;
            c.welcome_email.reply_to = reply_to;
            c.welcome_email.text_url = text_url;
            c.welcome_email.html_url = html_url;
            c.sso_setting.url_prefix = sso.0;
            c.sso_setting.js_sdk_cdn_url = sso.1;
            c.sso_setting.state_jwt_secret = sso.2;
            c.sso_setting.auto_link_provider_keys = sso.3;
            c.sso_setting.allowed_callback_urls = sso.4;
            c.user_verify.keys = keys.1;
            c
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Decoding an encoded configuration yields the same configuration,
        /// and the encoded form is always a valid header value.
        #[test]
        fn any_config_round_trips_through_the_header(c in config()) {
            let text = encode(&c).unwrap();
            prop_assert!(text.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'='));

            let mut headers = HeaderMap::new();
            set_tenant_config(&mut headers, &c).unwrap();
            prop_assert_eq!(tenant_config_from_headers(&headers).unwrap(), c.clone());
            prop_assert_eq!(decode(&text).unwrap(), c);
        }
    }
}
