use super::*;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Encrypt, RsaPublicKey};

const SPKI_LABEL: &str = "PUBLIC KEY";
const PKCS1_LABEL: &str = "RSA PUBLIC KEY";

/// Encrypts `plaintext` with the device key using PKCS#1 v1.5 padding.
///
/// Returns the raw ciphertext; the login URL carries it hex encoded.
pub fn encrypt_credentials(public_key_pem: &str, plaintext: &str) -> Result<Vec<u8>, SwitchError> {
    let key = parse_public_key(public_key_pem)?;
    let mut rng = rand::thread_rng();
    key.encrypt(&mut rng, Pkcs1v15Encrypt, plaintext.as_bytes())
        .map_err(|e| SwitchError::Encryption(e.to_string()))
}

/// Parses the RSA public key announced by the switch.
///
/// Accepts SubjectPublicKeyInfo (`PUBLIC KEY`) and PKCS#1 (`RSA PUBLIC KEY`)
/// PEM. Firmware releases differ in line wrapping and some omit the armor
/// lines entirely, so the base64 body is re-armored before decoding. A bare
/// body is assumed to be SubjectPublicKeyInfo.
pub fn parse_public_key(public_key_pem: &str) -> Result<RsaPublicKey, SwitchError> {
    let label = if public_key_pem.contains(PKCS1_LABEL) {
        PKCS1_LABEL
    } else {
        SPKI_LABEL
    };
    let pem = rearmor(label, public_key_pem);

    let parsed = if label == PKCS1_LABEL {
        RsaPublicKey::from_pkcs1_pem(&pem).map_err(|e| e.to_string())
    } else {
        RsaPublicKey::from_public_key_pem(&pem).map_err(|e| e.to_string())
    };
    parsed.map_err(|e| SwitchError::Configuration(format!("invalid rsaPublicKey: {e}")))
}

fn rearmor(label: &str, raw: &str) -> String {
    let body: String = raw
        .lines()
        .filter(|line| !line.trim_start().starts_with("-----"))
        .flat_map(|line| line.chars())
        .filter(|c| !c.is_whitespace())
        .collect();

    let mut pem = format!("-----BEGIN {label}-----\n");
    for chunk in body.as_bytes().chunks(64) {
        // base64 is ASCII, chunk boundaries are char boundaries
        pem.push_str(&String::from_utf8_lossy(chunk));
        pem.push('\n');
    }
    pem.push_str(&format!("-----END {label}-----\n"));
    pem
}
