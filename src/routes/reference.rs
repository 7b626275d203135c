//! Public reference data: emergency contacts and UI strings.

use axum::response::Json;

use crate::locale::{self, LocaleBundle};
use crate::services::contacts::{self, ContactView};

/// `GET /api/contacts`: emergency contacts with dial links.
pub async fn contacts() -> Json<Vec<ContactView>> {
    Json(contacts::list())
}

/// `GET /api/strings`: application name and UI labels.
pub async fn strings() -> Json<LocaleBundle> {
    Json(locale::bundle())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn contacts_carry_tel_uri() {
        let Json(list) = contacts().await;
        assert_eq!(list[0].tel_uri, "tel:১৬১২৩");
    }

    #[tokio::test]
    async fn strings_name_the_app() {
        let Json(bundle) = strings().await;
        assert_eq!(bundle.app_name, "কৃষি সেবা");
    }
}
