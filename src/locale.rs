//! Bengali (bn-BD) user-facing text.
//!
//! Single locale; every string the farmer can see is defined here so
//! services never leak English or backend text into responses.

use serde::Serialize;

pub const APP_NAME: &str = "কৃষি সেবা";
pub const APP_TAGLINE: &str = "কৃষকের বিশ্বস্ত বন্ধু";

/// Shown for every diagnosis failure, whatever the internal cause.
pub const ANALYSIS_FAILED: &str = "বিশ্লেষণ করতে সমস্যা হয়েছে। আবার চেষ্টা করুন।";

/// Shown when the chosen file cannot be read or is not a usable image.
pub const IMAGE_UNREADABLE: &str = "ছবিটি পড়া যায়নি। অন্য একটি ছবি বেছে নিন।";

/// Shown when the chosen file exceeds the upload limit.
pub const IMAGE_TOO_LARGE: &str = "ছবিটি খুব বড়। ছোট একটি ছবি বেছে নিন।";

/// Shown when an image is chosen while a previous one is still being analyzed.
pub const ANALYSIS_BUSY: &str = "আগের ছবির বিশ্লেষণ এখনও চলছে। একটু অপেক্ষা করুন।";

/// Shown when diagnosis is switched off because no AI key is configured.
pub const ANALYSIS_UNAVAILABLE: &str = "ফসল পরীক্ষা এই মুহূর্তে চালু নেই।";

/// Labels used by the UI chrome.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiStrings {
    pub login_title: &'static str,
    pub name_label: &'static str,
    pub phone_label: &'static str,
    pub login_btn: &'static str,
    pub dashboard_title: &'static str,
    pub analyze_crop: &'static str,
    pub forum: &'static str,
    pub emergency: &'static str,
    pub upload_photo: &'static str,
    pub analyzing: &'static str,
    pub result_title: &'static str,
    pub solution_title: &'static str,
    pub urgency_title: &'static str,
    pub no_posts: &'static str,
    pub new_post: &'static str,
    pub post_title: &'static str,
    pub post_content: &'static str,
    pub submit: &'static str,
    pub reply: &'static str,
    pub back: &'static str,
    pub logout: &'static str,
}

pub const UI_STRINGS: UiStrings = UiStrings {
    login_title: "লগইন করুন",
    name_label: "আপনার নাম",
    phone_label: "ফোন নম্বর",
    login_btn: "প্রবেশ করুন",
    dashboard_title: "ড্যাশবোর্ড",
    analyze_crop: "ফসল পরীক্ষা করুন",
    forum: "আলোচনা সভা",
    emergency: "জরুরি যোগাযোগ",
    upload_photo: "ছবি আপলোড করুন বা তুলুন",
    analyzing: "বিশ্লেষণ করা হচ্ছে...",
    result_title: "ফলাফল",
    solution_title: "সমাধান",
    urgency_title: "জরুরি অবস্থা",
    no_posts: "এখনও কোন আলোচনা নেই",
    new_post: "নতুন প্রশ্ন করুন",
    post_title: "শিরোনাম",
    post_content: "আপনার সমস্যা বিস্তারিত লিখুন",
    submit: "জমা দিন",
    reply: "উত্তর দিন",
    back: "পিছনে",
    logout: "লগআউট",
};

/// Everything the shell needs to label itself.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleBundle {
    pub locale: &'static str,
    pub app_name: &'static str,
    pub tagline: &'static str,
    pub strings: UiStrings,
}

#[must_use]
pub fn bundle() -> LocaleBundle {
    LocaleBundle { locale: "bn-BD", app_name: APP_NAME, tagline: APP_TAGLINE, strings: UI_STRINGS }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_serializes_camel_case_keys() {
        let json = serde_json::to_value(bundle()).unwrap();
        assert_eq!(json["appName"], APP_NAME);
        assert_eq!(json["strings"]["analyzeCrop"], "ফসল পরীক্ষা করুন");
        assert_eq!(json["locale"], "bn-BD");
    }
}
