//! Canned emergency advisories
//!
//! One static message per supported language. Messages are never
//! generated or edited at runtime; lookup falls back to the default
//! language for anything unrecognised.

use std::collections::HashMap;

/// National emergency number named in every advisory
pub const EMERGENCY_NUMBER: &str = "112";

/// Ambulance number named in every advisory
pub const AMBULANCE_NUMBER: &str = "108";

const ADVISORY_EN: &str = "\
EMERGENCY: What you describe may need urgent medical attention.

Call 112 (national emergency number) or 108 (ambulance) right now.

Do not wait for symptoms to improve. Go to the nearest hospital emergency \
department or ask someone nearby to take you. This assistant cannot provide \
emergency care.";

const ADVISORY_HI: &str = "\
आपातकाल: आपके बताए लक्षणों के लिए तुरंत चिकित्सा सहायता की आवश्यकता हो सकती है।

अभी 112 (राष्ट्रीय आपातकालीन नंबर) या 108 (एम्बुलेंस) पर कॉल करें।

लक्षणों के ठीक होने का इंतज़ार न करें। नज़दीकी अस्पताल के आपातकालीन विभाग में जाएँ \
या किसी पास के व्यक्ति से आपको ले जाने के लिए कहें। यह सहायक आपातकालीन देखभाल नहीं दे सकता।";

const ADVISORY_TA: &str = "\
அவசரம்: நீங்கள் விவரிக்கும் நிலைக்கு உடனடி மருத்துவ உதவி தேவைப்படலாம்.

இப்போதே 112 (தேசிய அவசர எண்) அல்லது 108 (ஆம்புலன்ஸ்) ஐ அழைக்கவும்.

அறிகுறிகள் குறையும் வரை காத்திருக்க வேண்டாம். அருகிலுள்ள மருத்துவமனையின் அவசர \
சிகிச்சைப் பிரிவுக்குச் செல்லவும். இந்த உதவியாளர் அவசர சிகிச்சை வழங்க இயலாது.";

const ADVISORY_TE: &str = "\
అత్యవసరం: మీరు వివరించిన పరిస్థితికి తక్షణ వైద్య సహాయం అవసరం కావచ్చు.

ఇప్పుడే 112 (జాతీయ అత్యవసర నంబర్) లేదా 108 (అంబులెన్స్) కు కాల్ చేయండి.

లక్షణాలు తగ్గే వరకు వేచి ఉండకండి. దగ్గరలోని ఆసుపత్రి అత్యవసర విభాగానికి వెళ్ళండి. \
ఈ సహాయకుడు అత్యవసర చికిత్స అందించలేదు.";

const ADVISORY_BN: &str = "\
জরুরি অবস্থা: আপনি যা বর্ণনা করছেন তার জন্য অবিলম্বে চিকিৎসা সহায়তা প্রয়োজন হতে পারে।

এখনই 112 (জাতীয় জরুরি নম্বর) বা 108 (অ্যাম্বুলেন্স) নম্বরে ফোন করুন।

উপসর্গ কমার জন্য অপেক্ষা করবেন না। নিকটতম হাসপাতালের জরুরি বিভাগে যান। \
এই সহকারী জরুরি চিকিৎসা দিতে পারে না।";

const ADVISORY_MR: &str = "\
आणीबाणी: तुम्ही सांगितलेल्या लक्षणांसाठी तातडीच्या वैद्यकीय मदतीची गरज असू शकते.

आत्ताच 112 (राष्ट्रीय आणीबाणी क्रमांक) किंवा 108 (रुग्णवाहिका) वर कॉल करा.

लक्षणे कमी होण्याची वाट पाहू नका. जवळच्या रुग्णालयाच्या आपत्कालीन विभागात जा. \
हा सहाय्यक आपत्कालीन उपचार देऊ शकत नाही.";

/// Built-in advisories keyed by language code
const DEFAULT_ADVISORIES: &[(&str, &str)] = &[
    ("en", ADVISORY_EN),
    ("hi", ADVISORY_HI),
    ("ta", ADVISORY_TA),
    ("te", ADVISORY_TE),
    ("bn", ADVISORY_BN),
    ("mr", ADVISORY_MR),
];

/// Language code → canned advisory, with a default entry for fallback.
#[derive(Debug, Clone)]
pub struct LocalizedAdvisory {
    messages: HashMap<String, &'static str>,
    default_language: String,
}

impl Default for LocalizedAdvisory {
    fn default() -> Self {
        Self::builtin("en")
    }
}

impl LocalizedAdvisory {
    /// Built-in messages with the given fallback language.
    ///
    /// An unsupported fallback is replaced by English so that lookup can
    /// never come back empty.
    pub fn builtin(default_language: &str) -> Self {
        let messages: HashMap<String, &'static str> = DEFAULT_ADVISORIES
            .iter()
            .map(|(code, text)| (code.to_string(), *text))
            .collect();

        let requested = primary_subtag(default_language);
        let default_language = if messages.contains_key(&requested) {
            requested
        } else {
            tracing::warn!(
                language = default_language,
                "Unsupported default advisory language, falling back to en"
            );
            "en".to_string()
        };

        Self {
            messages,
            default_language,
        }
    }

    /// Advisory for a language code; falls back to the default entry.
    ///
    /// Matching uses the lowercased primary subtag, so `hi-IN` resolves to `hi`.
    pub fn for_language(&self, language_code: &str) -> &'static str {
        self.messages
            .get(&primary_subtag(language_code))
            .or_else(|| self.messages.get(&self.default_language))
            .copied()
            .unwrap_or(ADVISORY_EN)
    }

    /// Whether a language has its own advisory
    pub fn supports(&self, language_code: &str) -> bool {
        self.messages.contains_key(&primary_subtag(language_code))
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Supported language codes, sorted
    pub fn languages(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.messages.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }
}

fn primary_subtag(code: &str) -> String {
    code.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}
