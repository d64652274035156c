//! Login methods offered by the platform's consumer app.

// self
use crate::_prelude::*;

/// Identity provider the user signs in with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginMethod {
	/// Kakao account login (OAuth 2.0 authorization code + PKCE).
	Kakao,
	/// Naver account login; recognized but not wired up yet.
	Naver,
}
impl LoginMethod {
	/// Methods the setup wizard offers.
	pub const SUPPORTED: &'static [LoginMethod] = &[LoginMethod::Kakao];

	/// Returns the stable lowercase label.
	pub const fn as_str(self) -> &'static str {
		match self {
			LoginMethod::Kakao => "kakao",
			LoginMethod::Naver => "naver",
		}
	}

	/// Value the platform expects in the `auth_type` form field.
	pub const fn platform_auth_type(self) -> &'static str {
		match self {
			LoginMethod::Kakao => "KAKAO",
			LoginMethod::Naver => "NAVER",
		}
	}

	/// Returns `true` when the wizard can complete this method.
	pub fn is_supported(self) -> bool {
		Self::SUPPORTED.contains(&self)
	}
}
impl Display for LoginMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for LoginMethod {
	type Err = UnknownLoginMethod;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"kakao" => Ok(LoginMethod::Kakao),
			"naver" => Ok(LoginMethod::Naver),
			_ => Err(UnknownLoginMethod { value: s.to_owned() }),
		}
	}
}

/// Error returned when parsing an unrecognized login method label.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unknown login method `{value}`.")]
pub struct UnknownLoginMethod {
	/// Raw value that failed to parse.
	pub value: String,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn parses_case_insensitively() {
		assert_eq!("Kakao".parse::<LoginMethod>(), Ok(LoginMethod::Kakao));
		assert_eq!(" naver ".parse::<LoginMethod>(), Ok(LoginMethod::Naver));
		assert!("apple".parse::<LoginMethod>().is_err());
	}

	#[test]
	fn only_kakao_is_supported() {
		assert!(LoginMethod::Kakao.is_supported());
		assert!(!LoginMethod::Naver.is_supported());
		assert_eq!(
			serde_json::to_string(&LoginMethod::Kakao).expect("Login method should serialize."),
			"\"kakao\""
		);
	}
}
