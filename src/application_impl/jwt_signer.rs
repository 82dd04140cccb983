use crate::application_port::{TokenError, TokenSigner};
use crate::domain_model::{AccessToken, AlgorithmFamily, Claims};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::fmt;

/// JWT strategy over `jsonwebtoken`, fixed to one algorithm and key pair.
pub struct JwtSigner {
    algorithm: Algorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for JwtSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtSigner")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl JwtSigner {
    /// Shared-secret signer for HS256/HS384/HS512.
    pub fn hmac(algorithm: Algorithm, secret: &[u8]) -> Result<Self, TokenError> {
        if AlgorithmFamily::of(algorithm) != AlgorithmFamily::Hmac {
            return Err(TokenError::SigningError(format!(
                "{:?} is not an HMAC algorithm",
                algorithm
            )));
        }
        if secret.is_empty() {
            return Err(TokenError::SigningError("empty HMAC secret".to_string()));
        }
        Ok(Self::with_keys(
            algorithm,
            EncodingKey::from_secret(secret),
            DecodingKey::from_secret(secret),
        ))
    }

    /// Key-pair signer for the RSA, EC and EdDSA families.
    pub fn from_pem(
        algorithm: Algorithm,
        private_pem: &[u8],
        public_pem: &[u8],
    ) -> Result<Self, TokenError> {
        let key_err = |e: jsonwebtoken::errors::Error| TokenError::SigningError(e.to_string());
        let (encoding, decoding) = match AlgorithmFamily::of(algorithm) {
            AlgorithmFamily::Rsa => (
                EncodingKey::from_rsa_pem(private_pem).map_err(key_err)?,
                DecodingKey::from_rsa_pem(public_pem).map_err(key_err)?,
            ),
            AlgorithmFamily::Ec => (
                EncodingKey::from_ec_pem(private_pem).map_err(key_err)?,
                DecodingKey::from_ec_pem(public_pem).map_err(key_err)?,
            ),
            AlgorithmFamily::Ed => (
                EncodingKey::from_ed_pem(private_pem).map_err(key_err)?,
                DecodingKey::from_ed_pem(public_pem).map_err(key_err)?,
            ),
            AlgorithmFamily::Hmac => {
                return Err(TokenError::SigningError(format!(
                    "{:?} takes a shared secret, not a PEM key pair",
                    algorithm
                )));
            }
        };
        Ok(Self::with_keys(algorithm, encoding, decoding))
    }

    fn with_keys(algorithm: Algorithm, encoding: EncodingKey, decoding: DecodingKey) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.algorithms = AlgorithmFamily::of(algorithm).members();
        // expiry is checked by the provider against its own clock
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        Self {
            algorithm,
            encoding,
            decoding,
            validation,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
}

impl TokenSigner for JwtSigner {
    fn family(&self) -> AlgorithmFamily {
        AlgorithmFamily::of(self.algorithm)
    }

    fn sign(&self, claims: &Claims) -> Result<AccessToken, TokenError> {
        encode(&Header::new(self.algorithm), claims, &self.encoding)
            .map(AccessToken)
            .map_err(|e| TokenError::SigningError(e.to_string()))
    }

    fn verify(&self, token: &AccessToken) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token.as_str(), &self.decoding, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidToken
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_)
                | ErrorKind::MissingRequiredClaim(_) => TokenError::MalformedInput(e.to_string()),
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::InvalidSignature,
            },
        )?;
        Ok(data.claims)
    }
}
