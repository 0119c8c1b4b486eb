use serde::{Deserialize, Serialize};

/// Contact details forwarded to the payment gateway with a charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub first_name: String,
    pub email: String,
    pub phone: String,
}

impl Customer {
    pub fn new(
        first_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }
}
