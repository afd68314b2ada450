use super::capability::Capabilities;
use super::db;
use super::error::{Error, Result};
use super::signature::Signature;
use super::types::*;
use super::version::VersionExtractor;
use indexmap::IndexMap;
use rayon::prelude::*;
use std::path::Path;

/// Rules shipped with the crate.
const BUILTIN_RULES: &str = include_str!("../rules/device_detect.yml");

/// One compiled family row.
struct FamilyRule {
    tier: Option<Tier>,
    signature: Signature,
    extractor: VersionExtractor,
}

/// User-Agent classifier.
///
/// Holds only compiled, read-only rules: every method is a pure function of
/// its input, so a single instance can be shared across threads.
pub struct DeviceDetect {
    /// Family rows in rule-file order.
    rules: IndexMap<Family, FamilyRule>,
    capabilities: Capabilities,
}

impl DeviceDetect {
    /// Build the detector from the built-in rules.
    pub fn new() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_RULES)
    }

    /// Load a rule file from `path` and build the detector.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: db::RuleFile = serde_yaml::from_str(yaml)?;

        if file.families.contains_key(&Family::Unknown) {
            return Err(Error::ReservedFamily);
        }

        // Compile rows in parallel; collect preserves the original order.
        let entries: Vec<(Family, db::FamilyEntry)> = file.families.into_iter().collect();
        let compiled = entries
            .into_par_iter()
            .map(|(family, entry)| -> Result<_> {
                let signature = Signature::build(&entry.detect, entry.unless)?;
                let extractor = VersionExtractor::build(entry.name, entry.extract)?;
                Ok((
                    family,
                    FamilyRule {
                        tier: entry.tier,
                        signature,
                        extractor,
                    },
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        let rules: IndexMap<Family, FamilyRule> = compiled.into_iter().collect();

        let capabilities = Capabilities::from_entries(file.capabilities);

        let detector = Self {
            rules,
            capabilities,
        };
        detector.validate()?;

        tracing::debug!(
            families = detector.rules.len(),
            tiered = detector.rules.values().filter(|r| r.tier.is_some()).count(),
            "compiled device detection rules"
        );

        Ok(detector)
    }

    /// Every family referenced by an exclusion list or a capability must have
    /// a row, and exclusions must not loop.
    fn validate(&self) -> Result<()> {
        for (&family, rule) in &self.rules {
            for &referenced in &rule.signature.unless {
                if !self.rules.contains_key(&referenced) {
                    return Err(Error::MissingRule { family, referenced });
                }
            }
            let mut path = vec![family];
            self.check_exclusions(family, &mut path)?;
        }

        let capabilities = [
            ("file_upload", &self.capabilities.file_upload),
            ("file_api", &self.capabilities.file_api),
        ];
        for (capability, rule) in capabilities {
            for referenced in rule.referenced_families() {
                if !self.rules.contains_key(&referenced) {
                    return Err(Error::MissingCapabilityRule {
                        capability,
                        referenced,
                    });
                }
            }
        }
        Ok(())
    }

    fn check_exclusions(&self, family: Family, path: &mut Vec<Family>) -> Result<()> {
        let Some(rule) = self.rules.get(&family) else {
            return Ok(());
        };
        for &next in &rule.signature.unless {
            if path.contains(&next) {
                return Err(Error::ExclusionCycle(path[0]));
            }
            path.push(next);
            self.check_exclusions(next, path)?;
            path.pop();
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Classification
    // -----------------------------------------------------------------------

    /// Classify a User-Agent string.
    ///
    /// Tiers are tried in [`Tier::ORDER`]; the first family that matches is
    /// returned, or [`DeviceInfo::unknown`] when none does.
    pub fn classify<'a>(&'a self, ua: &'a str) -> DeviceInfo<'a> {
        let info = Tier::ORDER
            .into_iter()
            .find_map(|tier| self.tier_info(tier, ua))
            .unwrap_or_else(DeviceInfo::unknown);
        tracing::trace!(family = %info.family, "classified user agent");
        info
    }

    /// The family tag of `ua`, or an empty string when it is unknown.
    pub fn device_type(&self, ua: &str) -> &'static str {
        match self.classify(ua).family {
            Family::Unknown => "",
            family => family.as_str(),
        }
    }

    /// Classify `ua` within a single tier.
    pub fn tier_info<'a>(&'a self, tier: Tier, ua: &'a str) -> Option<DeviceInfo<'a>> {
        self.rules
            .iter()
            .filter(|(_, rule)| rule.tier == Some(tier))
            .find(|(family, _)| self.matches(**family, ua))
            .map(|(&family, rule)| rule.extractor.extract(family, ua))
    }

    pub fn smartphone_info<'a>(&'a self, ua: &'a str) -> Option<DeviceInfo<'a>> {
        self.tier_info(Tier::Smartphone, ua)
    }

    /// Japanese carrier phones (DoCoMo, KDDI, SoftBank).
    pub fn mobile_info<'a>(&'a self, ua: &'a str) -> Option<DeviceInfo<'a>> {
        self.tier_info(Tier::Carrier, ua)
    }

    pub fn pc_browser_info<'a>(&'a self, ua: &'a str) -> Option<DeviceInfo<'a>> {
        self.tier_info(Tier::PcBrowser, ua)
    }

    /// Extract name and version for `family`, or `None` if `ua` does not
    /// match it. Works for untiered families such as Willcom.
    pub fn family_info<'a>(&'a self, family: Family, ua: &'a str) -> Option<DeviceInfo<'a>> {
        if !self.matches(family, ua) {
            return None;
        }
        self.rules
            .get(&family)
            .map(|rule| rule.extractor.extract(family, ua))
    }

    // -----------------------------------------------------------------------
    // Predicates
    // -----------------------------------------------------------------------

    /// True if `ua` carries one of the family's tokens and matches none of
    /// the families it excludes.
    pub fn matches(&self, family: Family, ua: &str) -> bool {
        let Some(rule) = self.rules.get(&family) else {
            return false;
        };
        rule.signature.contains_token(ua)
            && !rule
                .signature
                .unless
                .iter()
                .any(|&other| self.matches(other, ua))
    }

    pub fn is_ios(&self, ua: &str) -> bool {
        self.matches(Family::Ios, ua)
    }

    pub fn is_android(&self, ua: &str) -> bool {
        self.matches(Family::Android, ua)
    }

    pub fn is_windows_phone(&self, ua: &str) -> bool {
        self.matches(Family::WindowsPhone, ua)
    }

    pub fn is_ie(&self, ua: &str) -> bool {
        self.matches(Family::Ie, ua)
    }

    pub fn is_chrome(&self, ua: &str) -> bool {
        self.matches(Family::Chrome, ua)
    }

    pub fn is_firefox(&self, ua: &str) -> bool {
        self.matches(Family::Firefox, ua)
    }

    pub fn is_safari(&self, ua: &str) -> bool {
        self.matches(Family::Safari, ua)
    }

    pub fn is_opera(&self, ua: &str) -> bool {
        self.matches(Family::Opera, ua)
    }

    pub fn is_docomo(&self, ua: &str) -> bool {
        self.matches(Family::Docomo, ua)
    }

    pub fn is_kddi(&self, ua: &str) -> bool {
        self.matches(Family::Kddi, ua)
    }

    pub fn is_softbank(&self, ua: &str) -> bool {
        self.matches(Family::Softbank, ua)
    }

    pub fn is_willcom(&self, ua: &str) -> bool {
        self.matches(Family::Willcom, ua)
    }

    /// Japanese carrier phone (DoCoMo, KDDI or SoftBank).
    pub fn is_mobile(&self, ua: &str) -> bool {
        self.is_docomo(ua) || self.is_kddi(ua) || self.is_softbank(ua)
    }

    pub fn is_smart_phone(&self, ua: &str) -> bool {
        self.is_ios(ua) || self.is_android(ua) || self.is_windows_phone(ua)
    }

    pub fn is_android_or_ios(&self, ua: &str) -> bool {
        self.is_ios(ua) || self.is_android(ua)
    }

    // -----------------------------------------------------------------------
    // Capabilities
    // -----------------------------------------------------------------------

    /// Whether the device can upload files through an HTML form.
    pub fn can_upload_file(&self, ua: &str) -> bool {
        self.capabilities.file_upload.allows(self, ua)
    }

    /// Whether the browser supports the File API.
    pub fn can_use_file_api(&self, ua: &str) -> bool {
        self.capabilities.file_api.allows(self, ua)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    fn detector() -> &'static DeviceDetect {
        static DETECTOR: OnceLock<DeviceDetect> = OnceLock::new();
        DETECTOR.get_or_init(|| DeviceDetect::new().expect("built-in rules compile"))
    }

    const ANDROID_CHROME: &str = "Mozilla/5.0 (Linux; Android 4.4.2; Nexus 5 Build/KOT49H) \
        AppleWebKit/537.36 (KHTML, like Gecko) Chrome/36.0.1985.131 Mobile Safari/537.36";
    const WP_IE: &str = "Mozilla/5.0 (compatible; MSIE 10.0; Windows Phone 8.0; Trident/6.0; \
        IEMobile/10.0; ARM; Touch; NOKIA; Lumia 920)";
    const IS12T: &str = "Mozilla/4.0 (compatible; MSIE 7.0; Windows Phone OS 7.0; Trident/3.1; \
        IEMobile/7.0; FujitsuToshibaMobileCommun; IS12T; KDDI)";

    #[test]
    fn windows_phone_is_not_ie_or_kddi() {
        let dd = detector();
        assert!(dd.is_windows_phone(WP_IE));
        assert!(!dd.is_ie(WP_IE));
        assert!(dd.is_windows_phone(IS12T));
        assert!(!dd.is_kddi(IS12T));
        assert!(!dd.is_mobile(IS12T));
    }

    #[test]
    fn android_chrome_is_neither_chrome_nor_safari() {
        let dd = detector();
        assert!(dd.is_android(ANDROID_CHROME));
        assert!(!dd.is_chrome(ANDROID_CHROME));
        assert!(!dd.is_safari(ANDROID_CHROME));
        assert!(dd.is_smart_phone(ANDROID_CHROME));
        assert!(dd.is_android_or_ios(ANDROID_CHROME));
    }

    #[test]
    fn safari_excludes_desktop_chrome() {
        let dd = detector();
        let chrome = "Mozilla/5.0 (Windows NT 6.1) AppleWebKit/537.36 (KHTML, like Gecko) \
            Chrome/36.0.1985.125 Safari/537.36";
        assert!(dd.is_chrome(chrome));
        assert!(!dd.is_safari(chrome));
        let ipad = "Mozilla/5.0 (iPad; CPU OS 5_1_1 like Mac OS X) Safari/7534.48.3";
        assert!(!dd.is_safari(ipad));
        assert!(dd.is_safari("Mozilla/5.0 (Macintosh) Version/7.0.6 Safari/537.78.2"));
    }

    #[test]
    fn android_is_case_sensitive_ios_is_not() {
        let dd = detector();
        assert!(!dd.is_android("mozilla/5.0 (linux; android 4.4)"));
        assert!(dd.is_ios("mozilla/5.0 (iphone)"));
        assert!(dd.is_softbank("SOFTBANK/1.0"));
        assert!(dd.is_willcom("Mozilla/3.0(WILLCOM;KYOCERA/WX310K/2;1.2.2.16.000000/0.1/C100)"));
    }

    #[test]
    fn android_and_windows_phone_versions_are_single_digit() {
        let dd = detector();
        let info = dd.classify("Mozilla/5.0 (Linux; Android 4.10; X) AppleWebKit/537.36 (KHTML, like Gecko)");
        assert_eq!((info.version_major, info.version_minor), (Some(4), Some(1)));
        assert_eq!(info.version_etc(), None);

        let android10 = "Mozilla/5.0 (Linux; Android 10.0; Pixel 3)";
        let info = dd.classify(android10);
        assert_eq!(info.family, Family::Android);
        assert_eq!(info.name(), Some("android"));
        assert_eq!((info.version_major, info.version_minor), (None, None));
        assert!(!dd.can_upload_file(android10));
        assert!(!dd.can_use_file_api(android10));

        let info = dd.classify("Mozilla/5.0 (Windows Phone 10.0; Microsoft; Lumia 950)");
        assert_eq!(info.family, Family::WindowsPhone);
        assert_eq!(info.name(), Some("windows phone"));
        assert_eq!((info.version_major, info.version_minor), (None, None));

        let info = dd.classify("Mozilla/5.0 (iPhone; CPU iPhone OS 12_1 like Mac OS X)");
        assert_eq!((info.version_major, info.version_minor), (Some(12), Some(1)));
    }

    #[test]
    fn tier_precedence() {
        let dd = detector();
        let info = dd.classify(ANDROID_CHROME);
        assert_eq!(info.family, Family::Android);
        assert_eq!(dd.pc_browser_info(ANDROID_CHROME), None);
        assert_eq!(dd.mobile_info(ANDROID_CHROME), None);
        assert_eq!(dd.smartphone_info(ANDROID_CHROME), Some(info));
    }

    #[test]
    fn willcom_is_untiered() {
        let dd = detector();
        let ua = "Mozilla/3.0(DDIPOCKET;JRC/AH-J3001V,AH-J3002V/1.0/0100/c50)CNF/2.0";
        assert!(dd.classify(ua).is_unknown());
        assert_eq!(dd.device_type(ua), "");

        let info = dd.family_info(Family::Willcom, ua).unwrap();
        assert_eq!(info.family, Family::Willcom);
        assert_eq!(info.name(), Some("ddipocket"));
        assert_eq!(info.version_major, None);
        assert_eq!(info.version_minor, None);
        assert_eq!(info.version_etc(), None);
    }

    #[test]
    fn family_info_requires_a_match() {
        let dd = detector();
        assert_eq!(dd.family_info(Family::Chrome, ANDROID_CHROME), None);
        assert_eq!(dd.family_info(Family::Unknown, ANDROID_CHROME), None);
        let android = dd.family_info(Family::Android, ANDROID_CHROME).unwrap();
        assert_eq!(android.version_major, Some(4));
    }

    #[test]
    fn device_type_projection() {
        let dd = detector();
        assert_eq!(dd.device_type(ANDROID_CHROME), "android");
        assert_eq!(dd.device_type(WP_IE), "windows phone");
        assert_eq!(dd.device_type("SoftBank/1.0/930SH/SHJ001/SN123456789012345"), "softbank");
        assert_eq!(dd.device_type(""), "");
    }

    #[test]
    fn classification_is_idempotent() {
        let dd = detector();
        for ua in [ANDROID_CHROME, WP_IE, IS12T, "", "DoCoMo/2.0 N2001(c10)"] {
            assert_eq!(dd.classify(ua), dd.classify(ua));
        }
    }

    #[test]
    fn rejects_unknown_exclusion() {
        let yaml = "families:\n  chrome:\n    detect:\n      tokens: [Chrome]\n    unless: [android]\n";
        match DeviceDetect::from_yaml_str(yaml) {
            Err(Error::MissingRule { family, referenced }) => {
                assert_eq!(family, Family::Chrome);
                assert_eq!(referenced, Family::Android);
            }
            other => panic!("expected MissingRule, got {:?}", other.err()),
        }
    }

    #[test]
    fn rejects_exclusion_cycle() {
        let yaml = "families:
  chrome:
    detect:
      tokens: [Chrome]
    unless: [safari]
  safari:
    detect:
      tokens: [Safari]
    unless: [chrome]
";
        assert!(matches!(
            DeviceDetect::from_yaml_str(yaml),
            Err(Error::ExclusionCycle(Family::Chrome))
        ));
    }

    #[test]
    fn rejects_reserved_family() {
        let yaml = "families:\n  unknown:\n    detect:\n      tokens: [x]\n";
        assert!(matches!(
            DeviceDetect::from_yaml_str(yaml),
            Err(Error::ReservedFamily)
        ));
    }

    #[test]
    fn rejects_capability_for_missing_family() {
        let yaml = "families:
  ie:
    tier: pc_browser
    detect:
      tokens: [MSIE]
capabilities:
  file_api:
    tiers:
      pc_browser:
        chrome: '6'
";
        assert!(matches!(
            DeviceDetect::from_yaml_str(yaml),
            Err(Error::MissingCapabilityRule {
                capability: "file_api",
                referenced: Family::Chrome,
            })
        ));
    }

    #[test]
    fn missing_capabilities_deny_everything() {
        let yaml = "families:
  android:
    tier: smartphone
    detect:
      tokens: [Android]
    name: android
    extract:
      - regex: 'Android (\\d+)\\.(\\d+)'
        major: '$1'
        minor: '$2'
";
        let dd = DeviceDetect::from_yaml_str(yaml).unwrap();
        assert_eq!(dd.device_type(ANDROID_CHROME), "android");
        assert!(!dd.can_upload_file(ANDROID_CHROME));
        assert!(!dd.can_use_file_api(ANDROID_CHROME));
    }

    #[test]
    fn predicate_without_rule_is_false() {
        let yaml = "families:\n  ie:\n    detect:\n      tokens: [MSIE]\n";
        let dd = DeviceDetect::from_yaml_str(yaml).unwrap();
        assert!(!dd.is_android(ANDROID_CHROME));
        assert!(dd.is_ie("MSIE 10.0"));
        // ie has no tier, so it is never classified.
        assert!(dd.classify("MSIE 10.0").is_unknown());
    }

    #[test]
    fn detector_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DeviceDetect>();
    }

    #[test]
    #[tracing_test::traced_test]
    fn logs_rule_compilation() {
        DeviceDetect::new().unwrap();
        assert!(logs_contain("compiled device detection rules"));
        assert!(logs_contain("families=12"));
    }
}
