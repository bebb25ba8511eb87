use super::handlers::{callback, health, login, logout, profile, root};
use crate::idp::UserClaims;
use utoipa::{
    openapi::{Contact, InfoBuilder, License},
    OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        root::root,
        health::health,
        login::login,
        callback::callback,
        logout::logout,
        profile::profile,
    ),
    components(schemas(UserClaims, health::Health, root::Root)),
    tags(
        (name = "authgate", description = "OAuth2 authentication gateway"),
        (name = "auth", description = "Login, callback, logout and the guarded profile"),
        (name = "health", description = "Liveness probe")
    )
)]
struct ApiDoc;

/// `OpenAPI` document for every route the gateway serves.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info = cargo_info();
    doc
}

fn cargo_info() -> utoipa::openapi::Info {
    // Use Cargo.toml metadata instead of the derive defaults.
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(optional_str(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    info.contact = cargo_contact();
    info.license = optional_str(env!("CARGO_PKG_LICENSE")).map(|identifier| {
        let mut license = License::new(identifier);
        license.identifier = Some(identifier.to_string());
        license
    });
    info
}

fn cargo_contact() -> Option<Contact> {
    // Cargo authors are `;` separated and may include "Name <email>".
    let primary = env!("CARGO_PKG_AUTHORS").split(';').next().map(str::trim)?;
    let (name, email) = match primary.find('<') {
        Some(start) => (
            primary[..start].trim(),
            primary[start + 1..].trim_end_matches('>').trim(),
        ),
        None => (primary, ""),
    };

    let mut contact = Contact::new();
    contact.name = optional_str(name).map(str::to_string);
    contact.email = optional_str(email).map(str::to_string);
    (contact.name.is_some() || contact.email.is_some()).then_some(contact)
}

fn optional_str(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
