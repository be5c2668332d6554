//! Provider identifiers of the QIWI payment catalog.
//!
//! Every payment in the QIWI Wallet API is addressed to a *provider*: a numeric code naming
//! a destination class (a bank, a card network, a third-party service, or another QIWI wallet).
//! The codes below mirror the documented catalog and are grouped the same way:
//!
//! - [`banks`]: transfers to a card or account issued by a specific bank
//! - [`cards`]: transfers to a card by payment network
//! - [`services`]: other e-money services
//! - [`QIWI`]: wallet-to-wallet transfers
//!
//! # Examples
//!
//! ```rust
//! use qiwi_types::recipients::{self, banks, cards};
//!
//! assert_eq!(banks::TINKOFF, 466);
//! assert_eq!(cards::VISA_RUS, 1963);
//! assert_eq!(recipients::QIWI, 99);
//! assert_eq!(recipients::lookup("tinkoff"), Some(466));
//! ```

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// Provider identifier for wallet-to-wallet transfers.
pub const QIWI: u32 = 99;

/// Bank transfer providers.
pub mod banks {
    pub const ALFABANK: u32 = 464;
    pub const TINKOFF: u32 = 466;
    pub const AO_OTP_BANK: u32 = 804;
    pub const ROSBANK: u32 = 810;
    pub const RUSSIAN_STANDARD: u32 = 815;
    pub const VTB: u32 = 816;
    pub const PROMSVYAZBANK: u32 = 821;
    pub const SBERBANK: u32 = 870;
    pub const RENAISSANCE_CREDIT: u32 = 881;
    pub const MOSCOW_CREDIT_BANK: u32 = 1135;
}

/// Card network providers.
pub mod cards {
    /// Visa cards issued by Russian banks.
    pub const VISA_RUS: u32 = 1963;
    /// Visa cards issued by CIS banks.
    pub const VISA_SNG: u32 = 1960;
    /// MasterCard cards issued by Russian banks.
    pub const MASTERCARD_RUS: u32 = 21013;
    /// MasterCard cards issued by CIS banks.
    pub const MASTERCARD_SNG: u32 = 21012;
    pub const MIR: u32 = 31652;
}

/// Other e-money services.
pub mod services {
    pub const YANDEX_MONEY: u32 = 26476;
    pub const WEBMONEY: u32 = 31271;
}

/// Catalog group a provider belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipientGroup {
    Bank,
    Card,
    Service,
    Wallet,
}

impl Display for RecipientGroup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RecipientGroup::Bank => "banks",
            RecipientGroup::Card => "cards",
            RecipientGroup::Service => "services",
            RecipientGroup::Wallet => "wallet",
        };
        f.write_str(name)
    }
}

/// A catalog entry: semantic name, group and provider identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientInfo {
    /// Semantic name, e.g. `"alfabank"` or `"visa_rus"`
    pub name: &'static str,
    pub group: RecipientGroup,
    /// Provider identifier in the remote catalog
    pub id: u32,
}

impl RecipientInfo {
    const fn new(name: &'static str, group: RecipientGroup, id: u32) -> Self {
        Self { name, group, id }
    }

    const fn bank(name: &'static str, id: u32) -> Self {
        Self::new(name, RecipientGroup::Bank, id)
    }

    const fn card(name: &'static str, id: u32) -> Self {
        Self::new(name, RecipientGroup::Card, id)
    }

    const fn service(name: &'static str, id: u32) -> Self {
        Self::new(name, RecipientGroup::Service, id)
    }
}

/// All known providers, banks first, then cards, services and the wallet itself.
///
/// Backs [`lookup`] and [`name_of`].
pub static RECIPIENTS: &[RecipientInfo] = &[
    RecipientInfo::bank("alfabank", banks::ALFABANK),
    RecipientInfo::bank("tinkoff", banks::TINKOFF),
    RecipientInfo::bank("ao_otp_bank", banks::AO_OTP_BANK),
    RecipientInfo::bank("rosbank", banks::ROSBANK),
    RecipientInfo::bank("russian_standard", banks::RUSSIAN_STANDARD),
    RecipientInfo::bank("vtb", banks::VTB),
    RecipientInfo::bank("promsvyazbank", banks::PROMSVYAZBANK),
    RecipientInfo::bank("sberbank", banks::SBERBANK),
    RecipientInfo::bank("renaissance_credit", banks::RENAISSANCE_CREDIT),
    RecipientInfo::bank("moscow_credit_bank", banks::MOSCOW_CREDIT_BANK),
    RecipientInfo::card("visa_rus", cards::VISA_RUS),
    RecipientInfo::card("visa_sng", cards::VISA_SNG),
    RecipientInfo::card("mastercard_rus", cards::MASTERCARD_RUS),
    RecipientInfo::card("mastercard_sng", cards::MASTERCARD_SNG),
    RecipientInfo::card("mir", cards::MIR),
    RecipientInfo::service("yandex_money", services::YANDEX_MONEY),
    RecipientInfo::service("webmoney", services::WEBMONEY),
    RecipientInfo::new("qiwi", RecipientGroup::Wallet, QIWI),
];

static NAME_TO_ID: Lazy<HashMap<&'static str, u32>> =
    Lazy::new(|| RECIPIENTS.iter().map(|r| (r.name, r.id)).collect());

static ID_TO_NAME: Lazy<HashMap<u32, &'static str>> =
    Lazy::new(|| RECIPIENTS.iter().map(|r| (r.id, r.name)).collect());

/// Returns the provider identifier for a semantic name. Case-sensitive.
pub fn lookup(name: &str) -> Option<u32> {
    NAME_TO_ID.get(name).copied()
}

/// Reverse lookup of [`lookup`].
pub fn name_of(id: u32) -> Option<&'static str> {
    ID_TO_NAME.get(&id).copied()
}

/// Iterates over the providers of one catalog group.
pub fn in_group(group: RecipientGroup) -> impl Iterator<Item = &'static RecipientInfo> {
    RECIPIENTS.iter().filter(move |r| r.group == group)
}
