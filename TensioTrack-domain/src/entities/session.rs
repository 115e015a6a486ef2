use chrono::NaiveDate;
use serde::Serialize;
use validator::Validate;

/// User of the current authenticated session, held in memory only
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
}

/// Login form payload
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct LoginCredentials {
    #[validate(email(message = "Adresse email invalide"))]
    pub email: String,

    #[validate(length(min = 6, message = "Le mot de passe doit contenir au moins 6 caractères"))]
    pub password: String,
}

/// Registration form payload
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct Registration {
    #[validate(email(message = "Adresse email invalide"))]
    pub email: String,

    #[validate(length(min = 6, message = "Le mot de passe doit contenir au moins 6 caractères"))]
    pub password: String,

    #[validate(length(min = 1, message = "Le prénom est requis"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "Le nom est requis"))]
    pub last_name: String,

    pub date_of_birth: Option<NaiveDate>,
}
