//! Fill in the user data TODO items need before they can be shown.
//!
//! The server sends `VERIFY_ALL_PHONE_NUMBER`, `VERIFY_ALL_EMAIL` and
//! `LEGACY_EMAIL_VISIBILITY` items without saying which number or address
//! they are about. [`Enricher::enrich_home_screen`] walks a snapshot once and
//! resolves each of them against the lookup collaborators:
//!
//! | TODO type                 | source        | first record where        |
//! |---------------------------|---------------|---------------------------|
//! | `VERIFY_ALL_PHONE_NUMBER` | phone numbers | `!superseded && !verified` |
//! | `VERIFY_ALL_EMAIL`        | emails        | `!is_verified`            |
//! | `LEGACY_EMAIL_VISIBILITY` | emails        | `is_primary`              |
//!
//! Records with an empty number or address never qualify.
//!
//! The pass is fail-fast. The first decode or lookup error stops it; items
//! already handled keep their data and later items are left as delivered.
//! Every email-backed item performs its own lookup.

use tracing::{debug, instrument, warn};

use crate::error::EnrichError;
use crate::lookup::{Context, EmailLookup, PhoneNumberLookup};
use crate::model::item::{
    DecodeError, HomeScreen, HomeScreenItem, ItemKind, TodoType, ValidatedTodo,
};
use crate::model::record::{EmailRecord, PhoneNumberRecord};
use crate::timing;

/// Operation name recorded by the timing wrapper.
pub const ENRICH_OP: &str = "home.enrich_user_data";

/// First phone number that still needs verifying.
#[must_use]
pub fn select_unverified_phone(records: &[PhoneNumberRecord]) -> Option<&PhoneNumberRecord> {
    records
        .iter()
        .find(|record| !record.phone_number.is_empty() && record.needs_verification())
}

/// First email that is not verified.
#[must_use]
pub fn select_unverified_email(records: &[EmailRecord]) -> Option<&EmailRecord> {
    records
        .iter()
        .find(|record| !record.email.is_empty() && !record.is_verified)
}

/// First email flagged as primary.
#[must_use]
pub fn select_primary_email(records: &[EmailRecord]) -> Option<&EmailRecord> {
    records
        .iter()
        .find(|record| !record.email.is_empty() && record.is_primary)
}

/// Resolves TODO user data against a phone and an email collaborator.
///
/// Holds no state between passes.
#[derive(Debug, Clone)]
pub struct Enricher<P, E> {
    phones: P,
    emails: E,
}

impl<P, E> Enricher<P, E>
where
    P: PhoneNumberLookup,
    E: EmailLookup,
{
    pub const fn new(phones: P, emails: E) -> Self {
        Self { phones, emails }
    }

    /// Enrich every TODO item of `home` in place.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Decode`] when an item's kind cannot be read and
    /// [`EnrichError::Lookup`] when a collaborator fails. Items after the
    /// failing one are not visited.
    #[instrument(skip_all, fields(items = home.items.len(), account = ctx.account()))]
    pub fn enrich_home_screen(
        &self,
        ctx: &Context,
        home: &mut HomeScreen,
    ) -> Result<(), EnrichError> {
        timing::timed_result(ENRICH_OP, || -> Result<(), EnrichError> {
            for (index, item) in home.items.iter_mut().enumerate() {
                let kind = item.data.kind().inspect_err(|err| {
                    warn!(index, error = %err, "home screen item did not decode");
                })?;
                if kind != ItemKind::Todo {
                    continue;
                }
                self.enrich_todo_item(ctx, item).inspect_err(|err| {
                    warn!(index, error = %err, "aborting home screen enrichment");
                })?;
            }
            Ok(())
        })
    }

    /// Resolve the user data of a single TODO item.
    ///
    /// Items whose type carries no user data are left alone, as are items
    /// for which no record qualifies.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Decode`] when the item has no TODO payload and
    /// [`EnrichError::Lookup`] when the collaborator fails.
    pub fn enrich_todo_item(
        &self,
        ctx: &Context,
        item: &mut HomeScreenItem,
    ) -> Result<(), EnrichError> {
        let Some(todo) = item.data.todo.as_mut() else {
            return Err(DecodeError::MissingPayload(ItemKind::Todo).into());
        };

        let todo_type = todo.todo_type();
        let resolved = match todo_type {
            TodoType::VerifyAllPhoneNumber => {
                let numbers = self.phones.phone_numbers(ctx)?;
                select_unverified_phone(&numbers)
                    .map(|record| ValidatedTodo::VerifyAllPhoneNumber(record.phone_number.clone()))
            }
            TodoType::VerifyAllEmail => {
                let emails = self.emails.user_emails(ctx)?;
                select_unverified_email(&emails)
                    .map(|record| ValidatedTodo::VerifyAllEmail(record.email.clone()))
            }
            TodoType::LegacyEmailVisibility => {
                let emails = self.emails.user_emails(ctx)?;
                select_primary_email(&emails)
                    .map(|record| ValidatedTodo::LegacyEmailVisibility(record.email.clone()))
            }
            TodoType::None
            | TodoType::Bio
            | TodoType::Proof
            | TodoType::Device
            | TodoType::Follow
            | TodoType::Paperkey
            | TodoType::Team
            | TodoType::Folder
            | TodoType::GitRepo
            | TodoType::TeamShowcase
            | TodoType::AvatarUser
            | TodoType::AvatarTeam
            | TodoType::AddPhoneNumber
            | TodoType::AddEmail
            | TodoType::AnnouncementPlaceholder
            | TodoType::Unknown(_) => return Ok(()),
        };

        match resolved {
            Some(validated) => {
                debug!(%todo_type, "resolved todo user data");
                todo.resolve(validated);
            }
            None => debug!(%todo_type, "no qualifying record for todo"),
        }
        Ok(())
    }
}

/// Convenience wrapper around [`Enricher::enrich_home_screen`].
///
/// # Errors
///
/// See [`Enricher::enrich_home_screen`].
pub fn enrich_home_screen<P, E>(
    ctx: &Context,
    home: &mut HomeScreen,
    phones: &P,
    emails: &E,
) -> Result<(), EnrichError>
where
    P: PhoneNumberLookup + ?Sized,
    E: EmailLookup + ?Sized,
{
    Enricher::new(phones, emails).enrich_home_screen(ctx, home)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{LookupError, StaticEmails, StaticPhoneNumbers};
    use crate::model::item::{ItemData, TodoItem};
    use std::cell::Cell;

    fn todo(todo_type: TodoType) -> HomeScreenItem {
        HomeScreenItem::new(ItemData::todo(TodoItem::raw(todo_type)))
    }

    fn phones() -> StaticPhoneNumbers {
        StaticPhoneNumbers(vec![
            PhoneNumberRecord::new("n1", true, false),
            PhoneNumberRecord::new("n2", false, false),
            PhoneNumberRecord::new("n3", false, false),
        ])
    }

    fn emails() -> StaticEmails {
        StaticEmails(vec![
            EmailRecord::new("e1", true, true),
            EmailRecord::new("e2", false, false),
        ])
    }

    struct CountingEmails {
        calls: Cell<usize>,
        inner: StaticEmails,
    }

    impl EmailLookup for CountingEmails {
        fn user_emails(&self, ctx: &Context) -> Result<Vec<EmailRecord>, LookupError> {
            self.calls.set(self.calls.get() + 1);
            self.inner.user_emails(ctx)
        }
    }

    #[test]
    fn selection_rules_pick_first_match() {
        let phone_records = phones().0;
        assert_eq!(
            select_unverified_phone(&phone_records).map(|r| r.phone_number.as_str()),
            Some("n2")
        );

        let email_records = emails().0;
        assert_eq!(
            select_unverified_email(&email_records).map(|r| r.email.as_str()),
            Some("e2")
        );
        assert_eq!(
            select_primary_email(&email_records).map(|r| r.email.as_str()),
            Some("e1")
        );
    }

    #[test]
    fn superseded_numbers_are_skipped() {
        let records = vec![
            PhoneNumberRecord::new("old", false, true),
            PhoneNumberRecord::new("new", false, false),
        ];
        assert_eq!(
            select_unverified_phone(&records).map(|r| r.phone_number.as_str()),
            Some("new")
        );
    }

    #[test]
    fn empty_numbers_and_addresses_never_qualify() {
        let records = vec![
            PhoneNumberRecord::new("", false, false),
            PhoneNumberRecord::new("n9", false, false),
        ];
        assert_eq!(
            select_unverified_phone(&records).map(|r| r.phone_number.as_str()),
            Some("n9")
        );

        let emails = vec![EmailRecord::new("", false, true)];
        assert!(select_unverified_email(&emails).is_none());
        assert!(select_primary_email(&emails).is_none());
    }

    #[test]
    fn enrich_todo_item_resolves_each_type() {
        let enricher = Enricher::new(phones(), emails());
        let ctx = Context::new();

        let mut phone = todo(TodoType::VerifyAllPhoneNumber);
        enricher.enrich_todo_item(&ctx, &mut phone).expect("enrich phone");
        assert_eq!(phone.data.todo.as_ref().and_then(TodoItem::user_data), Some("n2"));

        let mut email = todo(TodoType::VerifyAllEmail);
        enricher.enrich_todo_item(&ctx, &mut email).expect("enrich email");
        assert_eq!(email.data.todo.as_ref().and_then(TodoItem::user_data), Some("e2"));

        let mut legacy = todo(TodoType::LegacyEmailVisibility);
        enricher.enrich_todo_item(&ctx, &mut legacy).expect("enrich legacy");
        assert_eq!(legacy.data.todo.as_ref().and_then(TodoItem::user_data), Some("e1"));
    }

    #[test]
    fn other_todo_types_do_not_consult_collaborators() {
        let counting = CountingEmails {
            calls: Cell::new(0),
            inner: emails(),
        };
        let enricher = Enricher::new(phones(), &counting);
        let ctx = Context::new();

        for todo_type in [TodoType::Bio, TodoType::AddEmail, TodoType::Unknown(77)] {
            let mut item = todo(todo_type);
            let before = item.clone();
            enricher.enrich_todo_item(&ctx, &mut item).expect("no-op");
            assert_eq!(item, before);
        }
        assert_eq!(counting.calls.get(), 0);
    }

    #[test]
    fn each_email_item_performs_its_own_lookup() {
        let counting = CountingEmails {
            calls: Cell::new(0),
            inner: emails(),
        };
        let mut home = HomeScreen::with_items(vec![
            todo(TodoType::VerifyAllEmail),
            todo(TodoType::LegacyEmailVisibility),
            todo(TodoType::VerifyAllEmail),
        ]);

        enrich_home_screen(&Context::new(), &mut home, &phones(), &counting).expect("enrich");
        assert_eq!(counting.calls.get(), 3);
    }

    #[test]
    fn todo_without_payload_is_a_decode_error() {
        let enricher = Enricher::new(phones(), emails());
        let mut item = HomeScreenItem::new(ItemData {
            t: 1,
            ..ItemData::default()
        });

        let err = enricher
            .enrich_todo_item(&Context::new(), &mut item)
            .expect_err("missing payload");
        assert!(matches!(err, EnrichError::Decode(DecodeError::MissingPayload(ItemKind::Todo))));
    }

    #[test]
    fn no_match_leaves_item_raw() {
        let enricher = Enricher::new(StaticPhoneNumbers::default(), StaticEmails::default());
        let mut item = todo(TodoType::VerifyAllPhoneNumber);
        enricher
            .enrich_todo_item(&Context::new(), &mut item)
            .expect("no match is not an error");
        assert_eq!(item, todo(TodoType::VerifyAllPhoneNumber));
    }
}
