//! Inquiry sources and their flat encoding on an inquiry document.
//!
//! How a case arrived is a multi-valued fact at creation time (a survivor can
//! call in themselves *and* be referred by an organisation). It is never
//! stored as such: [`encode`] folds it into presence flags, attribution text
//! and a channel bitmask.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

// ─── Channels ────────────────────────────────────────────────────────────────

/// A way a survivor can reach the organisation on their own.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InquiryChannel {
  Visit,
  Letter,
  Messenger,
  Email,
  Phone,
  SocialMedia,
  Hotline,
}

impl InquiryChannel {
  /// The bit this channel occupies in a [`ChannelMask`]. Values are fixed;
  /// they are persisted.
  pub const fn flag(self) -> i64 {
    match self {
      Self::Visit => 1,
      Self::Letter => 2,
      Self::Messenger => 4,
      Self::Email => 8,
      Self::Phone => 16,
      Self::SocialMedia => 32,
      Self::Hotline => 64,
    }
  }
}

/// Bitwise OR of [`InquiryChannel::flag`] values.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ChannelMask(i64);

impl ChannelMask {
  pub const EMPTY: Self = Self(0);

  pub const fn from_bits(bits: i64) -> Self { Self(bits) }

  pub const fn bits(self) -> i64 { self.0 }

  pub const fn is_empty(self) -> bool { self.0 == 0 }

  pub const fn with(self, channel: InquiryChannel) -> Self {
    Self(self.0 | channel.flag())
  }

  pub const fn contains(self, channel: InquiryChannel) -> bool {
    self.0 & channel.flag() != 0
  }

  /// Decode into the set of recognised channels. Unknown bits are ignored.
  pub fn channels(self) -> BTreeSet<InquiryChannel> {
    InquiryChannel::iter().filter(|c| self.contains(*c)).collect()
  }
}

impl FromIterator<InquiryChannel> for ChannelMask {
  fn from_iter<I: IntoIterator<Item = InquiryChannel>>(iter: I) -> Self {
    iter.into_iter().fold(Self::EMPTY, Self::with)
  }
}

// ─── Sources ─────────────────────────────────────────────────────────────────

/// One fact about how an inquiry originated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InquirySource {
  SelfInquiry { channels: BTreeSet<InquiryChannel> },
  ForwardedByOrganization { name: String },
  ForwardedByPerson { name: String },
  ForwardedBySurvivor { name: String },
}

impl InquirySource {
  pub fn self_inquiry(
    channels: impl IntoIterator<Item = InquiryChannel>,
  ) -> Self {
    Self::SelfInquiry { channels: channels.into_iter().collect() }
  }
}

/// The flat columns an inquiry document stores for its sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquiryFields {
  pub forwarded_by_organization:      bool,
  pub forwarded_by_organization_name: Option<String>,
  pub forwarded_by_person:            bool,
  pub forwarded_by_person_name:       Option<String>,
  pub forwarded_by_survivor:          bool,
  pub forwarded_by_survivor_name:     Option<String>,
  pub is_self_inquiry:                bool,
  pub self_inquiry_channels:          ChannelMask,
}

/// Fold `sources` into [`InquiryFields`].
///
/// Repeated forwarding sources of the same variant overwrite each other's
/// name; repeated self-inquiries accumulate channels.
pub fn encode<'a>(
  sources: impl IntoIterator<Item = &'a InquirySource>,
) -> InquiryFields {
  let mut fields = InquiryFields::default();
  for source in sources {
    match source {
      InquirySource::SelfInquiry { channels } => {
        fields.is_self_inquiry = true;
        fields.self_inquiry_channels = channels
          .iter()
          .copied()
          .fold(fields.self_inquiry_channels, ChannelMask::with);
      }
      InquirySource::ForwardedByOrganization { name } => {
        fields.forwarded_by_organization = true;
        fields.forwarded_by_organization_name = Some(name.clone());
      }
      InquirySource::ForwardedByPerson { name } => {
        fields.forwarded_by_person = true;
        fields.forwarded_by_person_name = Some(name.clone());
      }
      InquirySource::ForwardedBySurvivor { name } => {
        fields.forwarded_by_survivor = true;
        fields.forwarded_by_survivor_name = Some(name.clone());
      }
    }
  }
  fields
}
