//! Best-effort transcript language detection.

/// Detection is skipped below this length; short fragments default to "en".
const MIN_DETECT_CHARS: usize = 20;

/// Detect the dominant language of a transcript as an ISO 639-1 code.
///
/// Runs over the full text; empty or very short input, and anything the
/// detector cannot place, falls back to "en".
pub fn detect_language(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_DETECT_CHARS {
        return "en".to_string();
    }

    whatlang::detect(trimmed)
        .and_then(|info| isolang::Language::from_639_3(info.lang().code()))
        .and_then(|lang| lang.to_639_1())
        .map(|code| code.to_string())
        .unwrap_or_else(|| "en".to_string())
}

/// Human-readable English name for a 639-1 code, for use in prompts.
pub fn language_name(code: &str) -> String {
    isolang::Language::from_639_1(code)
        .map(|lang| lang.to_name().to_string())
        .unwrap_or_else(|| code.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_english() {
        let text = "This lecture covers the fundamentals of operating systems, \
                    including processes, threads, and memory management.";
        assert_eq!(detect_language(text), "en");
    }

    #[test]
    fn test_detects_spanish() {
        let text = "Esta conferencia trata sobre los fundamentos de los sistemas \
                    operativos, incluyendo procesos, hilos y gestión de memoria.";
        assert_eq!(detect_language(text), "es");
    }

    #[test]
    fn test_short_text_defaults_to_english() {
        assert_eq!(detect_language(""), "en");
        assert_eq!(detect_language("hola"), "en");
        assert_eq!(detect_language("   \n  "), "en");
    }

    #[test]
    fn test_language_name() {
        assert_eq!(language_name("en"), "English");
        assert_eq!(language_name("es"), "Spanish");
        // Unknown codes pass through for the prompt to cope with
        assert_eq!(language_name("zz"), "zz");
    }
}
