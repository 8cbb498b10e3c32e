use serde::{Deserialize, Serialize};

// POST /send-confirmation body
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct SendConfirmationRequest {
    #[serde(default)]
    pub email: Option<String>,
}

impl SendConfirmationRequest {
    // the address, if one was actually given
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|email| !email.is_empty())
    }
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ErrorBody {
    pub error: String,
}

// Sender identity shown in the From header
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Sender {
    pub email: String,
    pub name: String,
}

// Message handed to the mail provider
#[derive(Clone, Debug)]
pub struct OutboundEmail {
    pub to: String,
    pub from: Sender,
    pub subject: String,
    pub html: String,
}

// Android install metadata attached to a verification link
#[derive(Clone, Debug)]
pub struct AndroidSettings {
    pub package_name: String,
    pub install_app: bool,
    pub minimum_version: String,
}

// How the identity provider should build the link
#[derive(Clone, Debug)]
pub struct LinkSettings {
    pub continue_url: String,
    pub handle_code_in_app: bool,
    pub android: Option<AndroidSettings>,
}
