use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rlp::RlpStream;
use sha3::{Digest, Keccak256};

use crate::account::PrivateKey;
use crate::encoding::trim_leading_zeros;
use crate::error::SignerError;
use crate::transaction::{RawTransaction, TransactionSpec};

/// Keccak-256 (the pre-standard SHA-3 padding used by the ledger).
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let digest = Keccak256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Uncompressed public key (without the `0x04` tag) for a secret scalar.
pub fn public_key_from_private(secret: &[u8; 32]) -> Result<[u8; 64], SignerError> {
    let signing_key = SigningKey::from_slice(secret).map_err(|_| SignerError::InvalidKey)?;
    let public = k256::PublicKey::from(signing_key.verifying_key());
    let point = public.to_encoded_point(false);

    let mut out = [0u8; 64];
    out.copy_from_slice(&point.as_bytes()[1..]);
    Ok(out)
}

/// True when the 64 bytes are the affine coordinates of a curve point.
pub fn is_valid_public_key(raw: &[u8; 64]) -> bool {
    let mut sec1 = [0u8; 65];
    sec1[0] = 0x04;
    sec1[1..].copy_from_slice(raw);
    k256::PublicKey::from_sec1_bytes(&sec1).is_ok()
}

/// Produces a broadcastable signed transaction from assembled fields.
pub trait Signer: Send + Sync {
    fn sign_transaction(
        &self,
        spec: &TransactionSpec,
        private_key: &PrivateKey,
    ) -> Result<RawTransaction, SignerError>;
}

/// In-process secp256k1 signer producing legacy EIP-155 transactions.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSigner;

impl LocalSigner {
    /// Keccak of `rlp([nonce, gasPrice, gasLimit, to, value, data, chainId, 0, 0])`.
    pub fn sighash(spec: &TransactionSpec) -> [u8; 32] {
        let mut stream = RlpStream::new_list(9);
        append_body(&mut stream, spec);
        stream.append(&spec.chain_id);
        stream.append(&0u8);
        stream.append(&0u8);
        keccak256(&stream.out())
    }
}

impl Signer for LocalSigner {
    fn sign_transaction(
        &self,
        spec: &TransactionSpec,
        private_key: &PrivateKey,
    ) -> Result<RawTransaction, SignerError> {
        if spec.gas_limit == 0 {
            return Err(SignerError::Signing("gas limit must be non-zero".into()));
        }
        if spec.chain_id == 0 {
            return Err(SignerError::Signing("chain id must be non-zero".into()));
        }

        let signing_key =
            SigningKey::from_slice(private_key.as_bytes()).map_err(|_| SignerError::InvalidKey)?;
        let sighash = Self::sighash(spec);
        let (signature, recovery_id) = signing_key
            .sign_prehash_recoverable(&sighash)
            .map_err(|e| SignerError::Signing(e.to_string()))?;

        let v = u64::from(recovery_id.is_y_odd()) + spec.chain_id * 2 + 35;
        let sig_bytes = signature.to_bytes();
        let r = trim_leading_zeros(&sig_bytes[..32]).to_vec();
        let s = trim_leading_zeros(&sig_bytes[32..]).to_vec();

        let mut stream = RlpStream::new_list(9);
        append_body(&mut stream, spec);
        stream.append(&v);
        stream.append(&r);
        stream.append(&s);
        Ok(RawTransaction::new(stream.out().to_vec()))
    }
}

fn append_body(stream: &mut RlpStream, spec: &TransactionSpec) {
    let to = spec.to.map(|a| a.as_bytes().to_vec()).unwrap_or_default();
    stream.append(&spec.nonce);
    stream.append(&spec.gas_price);
    stream.append(&spec.gas_limit);
    stream.append(&to);
    stream.append(&spec.value.unwrap_or(0));
    stream.append(&spec.data.as_bytes().to_vec());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Address;
    use crate::encoding::EncodedPayload;
    use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

    #[test]
    fn test_keccak_empty_input() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    fn eip155_example() -> (TransactionSpec, PrivateKey) {
        let spec = TransactionSpec {
            from: Address::ZERO,
            to: Some(Address::from_bytes([0x35; 20])),
            value: Some(1_000_000_000_000_000_000),
            gas_limit: 21_000,
            gas_price: 20_000_000_000,
            nonce: 9,
            data: EncodedPayload::from_bytes(Vec::new()),
            chain_id: 1,
        };
        (spec, PrivateKey::from_bytes([0x46; 32]).unwrap())
    }

    #[test]
    fn test_eip155_reference_transaction() {
        let (spec, key) = eip155_example();
        assert_eq!(
            hex::encode(LocalSigner::sighash(&spec)),
            "daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53"
        );

        let raw = LocalSigner.sign_transaction(&spec, &key).unwrap();
        assert_eq!(
            raw.to_hex(),
            "0xf86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83"
        );
    }

    #[test]
    fn test_signature_recovers_sender() {
        let (mut spec, key) = eip155_example();
        spec.chain_id = 440;
        spec.to = None;
        spec.data = EncodedPayload::from_bytes(vec![0xde, 0xad, 0xbe, 0xef]);

        let raw = LocalSigner.sign_transaction(&spec, &key).unwrap();
        let rlp = rlp::Rlp::new(raw.as_bytes());
        assert_eq!(rlp.item_count().unwrap(), 9);

        let v: u64 = rlp.val_at(6).unwrap();
        let r: Vec<u8> = rlp.val_at(7).unwrap();
        let s: Vec<u8> = rlp.val_at(8).unwrap();
        let mut sig = [0u8; 64];
        sig[32 - r.len()..32].copy_from_slice(&r);
        sig[64 - s.len()..].copy_from_slice(&s);

        let signature = Signature::from_slice(&sig).unwrap();
        let recovery_id = RecoveryId::from_byte((v - 35 - 2 * 440) as u8).unwrap();
        let recovered =
            VerifyingKey::recover_from_prehash(&LocalSigner::sighash(&spec), &signature, recovery_id)
                .unwrap();

        let expected = SigningKey::from_slice(key.as_bytes()).unwrap();
        assert_eq!(&recovered, expected.verifying_key());
    }

    #[test]
    fn test_zero_gas_limit_is_rejected() {
        let (mut spec, key) = eip155_example();
        spec.gas_limit = 0;
        assert!(LocalSigner.sign_transaction(&spec, &key).is_err());
    }
}
