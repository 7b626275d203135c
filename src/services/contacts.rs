//! Emergency agricultural contacts. Static, read-only.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub name: &'static str,
    /// Shown and dialed as written, Bengali digits included.
    pub number: &'static str,
    pub designation: &'static str,
    pub location: &'static str,
}

pub const EMERGENCY_CONTACTS: [Contact; 3] = [
    Contact { name: "কৃষি কল সেন্টার", number: "১৬১২৩", designation: "টোল-ফ্রি হেল্পলাইন", location: "বাংলাদেশ" },
    Contact {
        name: "কৃষি সম্প্রসারণ অধিদপ্তর",
        number: "০২-৯১১০৬৫৫",
        designation: "প্রধান কার্যালয়",
        location: "খামারবাড়ি, ঢাকা",
    },
    Contact { name: "উদ্ভিদ সংগনিরোধ উইং", number: "০২-৯১১০৪০৫", designation: "রোগ নিয়ন্ত্রণ শাখা", location: "ঢাকা" },
];

/// Contact plus its dial link, as served to the shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactView {
    #[serde(flatten)]
    pub contact: Contact,
    pub tel_uri: String,
}

/// `tel:` deep link with the number string untouched.
#[must_use]
pub fn tel_uri(number: &str) -> String {
    format!("tel:{number}")
}

#[must_use]
pub fn list() -> Vec<ContactView> {
    EMERGENCY_CONTACTS.iter().map(|&contact| ContactView { contact, tel_uri: tel_uri(contact.number) }).collect()
}
