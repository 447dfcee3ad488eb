use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    error::{EngineError, EngineResult},
    models::{Booking, Platform},
};

/// Which booking date decides operational membership in a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionAnchor {
    CheckIn,
    CheckOut,
}

#[derive(Debug, Clone, Copy)]
pub struct PlatformRule {
    pub platform: Platform,
    pub key: &'static str,
    pub aliases: &'static [&'static str],
    pub anchor: AttributionAnchor,
    pub defers_payout: bool,
    pub allows_prepayment: bool,
}

static AIRBNB_RULE: PlatformRule = PlatformRule {
    platform: Platform::Airbnb,
    key: "airbnb",
    aliases: &["channel_a", "channela"],
    anchor: AttributionAnchor::CheckIn,
    defers_payout: false,
    allows_prepayment: false,
};

static BOOKING_COM_RULE: PlatformRule = PlatformRule {
    platform: Platform::BookingCom,
    key: "booking",
    aliases: &["booking.com", "booking_com", "bookingcom", "channel_b", "channelb"],
    anchor: AttributionAnchor::CheckOut,
    defers_payout: true,
    allows_prepayment: false,
};

static DIRECT_RULE: PlatformRule = PlatformRule {
    platform: Platform::Direct,
    key: "direct",
    aliases: &["website", "walk_in"],
    anchor: AttributionAnchor::CheckIn,
    defers_payout: false,
    allows_prepayment: true,
};

static VRBO_RULE: PlatformRule = PlatformRule {
    platform: Platform::Vrbo,
    key: "vrbo",
    aliases: &["homeaway"],
    anchor: AttributionAnchor::CheckIn,
    defers_payout: false,
    allows_prepayment: false,
};

/// One row per platform. Table order is the reporting order.
pub static PLATFORM_RULES: [&PlatformRule; 4] =
    [&AIRBNB_RULE, &BOOKING_COM_RULE, &DIRECT_RULE, &VRBO_RULE];

/// A new `Platform` variant does not compile until it has a row here.
pub fn rule_for(platform: Platform) -> &'static PlatformRule {
    match platform {
        Platform::Airbnb => &AIRBNB_RULE,
        Platform::BookingCom => &BOOKING_COM_RULE,
        Platform::Direct => &DIRECT_RULE,
        Platform::Vrbo => &VRBO_RULE,
    }
}

pub fn platforms() -> impl Iterator<Item = Platform> {
    PLATFORM_RULES.iter().map(|rule| rule.platform)
}

pub fn attribution_anchor(platform: Platform) -> AttributionAnchor {
    rule_for(platform).anchor
}

pub fn deferral_rule(platform: Platform) -> bool {
    rule_for(platform).defers_payout
}

pub fn allows_prepayment(platform: Platform) -> bool {
    rule_for(platform).allows_prepayment
}

/// The booking date the platform's anchor points at.
pub fn anchor_date(booking: &Booking) -> NaiveDate {
    match attribution_anchor(booking.platform) {
        AttributionAnchor::CheckIn => booking.check_in_date,
        AttributionAnchor::CheckOut => booking.check_out_date,
    }
}

pub fn parse_platform(raw: &str) -> EngineResult<Platform> {
    let normalized = raw.trim().to_ascii_lowercase().replace([' ', '-'], "_");
    PLATFORM_RULES
        .iter()
        .find(|rule| rule.key == normalized || rule.aliases.contains(&normalized.as_str()))
        .map(|rule| rule.platform)
        .ok_or_else(|| EngineError::BadRequest(format!("Unsupported platform '{}'.", raw.trim())))
}

impl FromStr for Platform {
    type Err = EngineError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        parse_platform(raw)
    }
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        rule_for(self).key
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        allows_prepayment, attribution_anchor, deferral_rule, parse_platform, platforms,
        rule_for, AttributionAnchor, PLATFORM_RULES,
    };
    use crate::models::Platform;

    #[test]
    fn every_platform_has_exactly_one_row() {
        for platform in [
            Platform::Airbnb,
            Platform::BookingCom,
            Platform::Direct,
            Platform::Vrbo,
        ] {
            let rows = PLATFORM_RULES
                .iter()
                .filter(|rule| rule.platform == platform)
                .count();
            assert_eq!(rows, 1, "{platform:?}");
        }
        assert_eq!(platforms().count(), PLATFORM_RULES.len());
    }

    #[test]
    fn rule_lookup_returns_the_platforms_own_row() {
        for platform in platforms() {
            assert_eq!(rule_for(platform).platform, platform);
        }
        assert_eq!(rule_for(Platform::Vrbo).key, "vrbo");
        assert_eq!(rule_for(Platform::Direct).key, "direct");
    }

    #[test]
    fn booking_com_anchors_on_checkout_and_defers() {
        assert_eq!(
            attribution_anchor(Platform::BookingCom),
            AttributionAnchor::CheckOut
        );
        assert!(deferral_rule(Platform::BookingCom));
        assert_eq!(
            attribution_anchor(Platform::Airbnb),
            AttributionAnchor::CheckIn
        );
        assert!(!deferral_rule(Platform::Airbnb));
        assert!(!deferral_rule(Platform::Direct));
    }

    #[test]
    fn only_direct_allows_prepayment() {
        assert!(allows_prepayment(Platform::Direct));
        assert!(!allows_prepayment(Platform::Airbnb));
        assert!(!allows_prepayment(Platform::BookingCom));
    }

    #[test]
    fn parses_keys_and_aliases() {
        assert_eq!(parse_platform("Airbnb").expect("key"), Platform::Airbnb);
        assert_eq!(
            parse_platform("Booking.com").expect("alias"),
            Platform::BookingCom
        );
        assert_eq!(
            parse_platform("channel-b").expect("alias"),
            Platform::BookingCom
        );
        assert_eq!(
            "direct".parse::<Platform>().expect("key"),
            Platform::Direct
        );
        assert!(parse_platform("expedia").is_err());
    }

    #[test]
    fn display_uses_table_key() {
        assert_eq!(Platform::BookingCom.to_string(), "booking");
    }
}
