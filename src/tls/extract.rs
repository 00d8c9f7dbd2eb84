//! Leaf certificate extraction.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use x509_parser::objects::{oid2abbrev, oid_registry};
use x509_parser::time::ASN1Time;
use x509_parser::x509::X509Name;

use super::SslInfo;

/// Parses a DER-encoded leaf certificate into `SslInfo`.
///
/// Validity is judged only against the certificate's own not-before/not-after
/// window at `now`; the trust chain is never consulted.
pub(crate) fn certificate_info(der: &[u8], now: DateTime<Utc>) -> Result<SslInfo> {
    let (_, cert) = x509_parser::parse_x509_certificate(der)
        .map_err(|e| anyhow!("certificate parse error: {e}"))?;
    let validity = cert.validity();

    let valid_from = asn1_to_utc(&validity.not_before, "not_before")?;
    let valid_to = asn1_to_utc(&validity.not_after, "not_after")?;

    Ok(SslInfo {
        issuer: distinguished_name(cert.issuer()),
        valid_from,
        valid_to,
        is_valid: is_within_validity(now, valid_from, valid_to),
    })
}

/// Renders a name most specific RDN first (`CN=.., O=.., C=..`), the reverse
/// of its DER order. Multi-valued RDNs are joined with ` + `.
fn distinguished_name(name: &X509Name<'_>) -> String {
    let rdns: Vec<String> = name
        .iter_rdn()
        .map(|rdn| {
            rdn.iter()
                .map(|attr| {
                    let key = oid2abbrev(attr.attr_type(), oid_registry())
                        .map(str::to_owned)
                        .unwrap_or_else(|_| attr.attr_type().to_id_string());
                    let value = attr
                        .as_str()
                        .map(str::to_owned)
                        .unwrap_or_else(|_| String::from_utf8_lossy(attr.as_slice()).into_owned());
                    format!("{key}={value}")
                })
                .collect::<Vec<_>>()
                .join(" + ")
        })
        .collect();
    rdns.into_iter().rev().collect::<Vec<_>>().join(", ")
}

fn asn1_to_utc(time: &ASN1Time, field: &str) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(time.timestamp(), 0)
        .ok_or_else(|| anyhow!("{field} is out of range: {}", time.timestamp()))
}

/// Whether `now` lies within `[valid_from, valid_to]`, both ends inclusive.
pub(crate) fn is_within_validity(
    now: DateTime<Utc>,
    valid_from: DateTime<Utc>,
    valid_to: DateTime<Utc>,
) -> bool {
    valid_from <= now && now <= valid_to
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use x509_parser::prelude::FromDer;

    // C=US, O=Acme, CN=R3 in DER order
    const ISSUER_DER: &[u8] = &[
        0x30, 0x29, //
        0x31, 0x0B, 0x30, 0x09, 0x06, 0x03, 0x55, 0x04, 0x06, 0x13, 0x02, b'U', b'S', //
        0x31, 0x0D, 0x30, 0x0B, 0x06, 0x03, 0x55, 0x04, 0x0A, 0x0C, 0x04, b'A', b'c', b'm', b'e', //
        0x31, 0x0B, 0x30, 0x09, 0x06, 0x03, 0x55, 0x04, 0x03, 0x0C, 0x02, b'R', b'3',
    ];

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_is_within_validity() {
        let from = at(2025, 1, 1);
        let to = at(2026, 1, 1);
        assert!(is_within_validity(at(2025, 6, 1), from, to));
        assert!(is_within_validity(from, from, to));
        assert!(is_within_validity(to, from, to));
        assert!(!is_within_validity(at(2024, 12, 31), from, to));
        assert!(!is_within_validity(at(2026, 1, 2), from, to));
    }

    #[test]
    fn test_distinguished_name_most_specific_first() {
        let (rest, name) = X509Name::from_der(ISSUER_DER).expect("valid name");
        assert!(rest.is_empty());
        assert_eq!(distinguished_name(&name), "CN=R3, O=Acme, C=US");
    }

    #[test]
    fn test_certificate_info_rejects_garbage() {
        let result = certificate_info(b"definitely not DER", Utc::now());
        assert!(result.is_err());
    }
}
