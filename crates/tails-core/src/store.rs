//! The `TailsStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `tails-store-sqlite`).
//! Higher layers (`tails-api`, `tails-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use crate::{
  admin::DashboardCounts,
  adoption::{
    AdoptionRequest, ApplicationSummary, IncomingApplication, RequestStatus,
  },
  listing::{Adoptable, AdoptableUpdate, ListingQuery, NewAdoptable, Page},
  message::Message,
  meta::{PetBreed, PetType},
  pet::{
    HealthStat, MedicalFile, NewHealthStat, NewMedicalFile, NewPet, Pet,
    PetUpdate, StatMetric,
  },
  user::{Credentials, NewUser, ProfileInput, User, UserProfile},
};

/// Abstraction over a Happy Tails storage backend.
///
/// Ownership rules (caretaker-only listing edits, participant-only messages,
/// owner-only pets) are enforced by the backend, inside the same statement or
/// transaction as the write they guard. Rule violations surface as a
/// [`crate::Error`] somewhere in the returned error's `source()` chain so the
/// HTTP layer can map them to a status code.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait TailsStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new account. Fails with `Conflict` if the email is taken.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look up login credentials by (already normalised) email.
  fn credentials_by_email(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<Credentials>, Self::Error>> + Send + '_;

  /// Resolve a Google identity to an account.
  ///
  /// Matches on the Google subject first, then links an existing account
  /// with the same email, and otherwise creates a new account.
  fn find_or_create_google_user(
    &self,
    google_sub: String,
    email: String,
    name: String,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_profile(
    &self,
    user_id: i64,
  ) -> impl Future<Output = Result<Option<UserProfile>, Self::Error>> + Send + '_;

  fn upsert_profile(
    &self,
    user_id: i64,
    input: ProfileInput,
  ) -> impl Future<Output = Result<UserProfile, Self::Error>> + Send + '_;

  // ── Reference metadata ────────────────────────────────────────────────

  fn list_types(
    &self,
  ) -> impl Future<Output = Result<Vec<PetType>, Self::Error>> + Send + '_;

  fn list_breeds(
    &self,
    type_id: Option<i64>,
  ) -> impl Future<Output = Result<Vec<PetBreed>, Self::Error>> + Send + '_;

  fn create_type(
    &self,
    name: String,
  ) -> impl Future<Output = Result<PetType, Self::Error>> + Send + '_;

  fn create_breed(
    &self,
    type_id: i64,
    name: String,
  ) -> impl Future<Output = Result<PetBreed, Self::Error>> + Send + '_;

  /// Fails with `Conflict` while any listing, pet or breed references it.
  fn delete_type(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Fails with `Conflict` while any listing or pet references it.
  fn delete_breed(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Listings ──────────────────────────────────────────────────────────

  /// Create a listing owned by `caretaker_id` with already-stored images.
  fn create_adoptable(
    &self,
    caretaker_id: i64,
    input: NewAdoptable,
    images: Vec<String>,
  ) -> impl Future<Output = Result<Adoptable, Self::Error>> + Send + '_;

  fn get_adoptable(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Adoptable>, Self::Error>> + Send + '_;

  /// Filtered, paginated listing search. Newest listings first.
  fn search_adoptables<'a>(
    &'a self,
    query: &'a ListingQuery,
  ) -> impl Future<Output = Result<Page<Adoptable>, Self::Error>> + Send + 'a;

  fn list_adoptables_by_caretaker(
    &self,
    caretaker_id: i64,
  ) -> impl Future<Output = Result<Vec<Adoptable>, Self::Error>> + Send + '_;

  fn update_adoptable(
    &self,
    caretaker_id: i64,
    id: i64,
    update: AdoptableUpdate,
  ) -> impl Future<Output = Result<Adoptable, Self::Error>> + Send + '_;

  /// Append images; the listing may hold at most
  /// [`crate::listing::MAX_IMAGES`].
  fn add_adoptable_images(
    &self,
    caretaker_id: i64,
    id: i64,
    images: Vec<String>,
  ) -> impl Future<Output = Result<Adoptable, Self::Error>> + Send + '_;

  /// Delete a listing with its requests and messages. Returns the image
  /// filenames that were attached so the caller can remove the files.
  fn delete_adoptable(
    &self,
    caretaker_id: i64,
    id: i64,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  // ── Adoption requests ─────────────────────────────────────────────────

  /// Submit an application. Rejects the listing's own caretaker, duplicate
  /// applications, and listings that are not `Available`.
  fn apply(
    &self,
    adopter_id: i64,
    adoptable_id: i64,
    message: String,
  ) -> impl Future<Output = Result<AdoptionRequest, Self::Error>> + Send + '_;

  fn applications_by_adopter(
    &self,
    adopter_id: i64,
  ) -> impl Future<Output = Result<Vec<ApplicationSummary>, Self::Error>> + Send + '_;

  fn incoming_applications(
    &self,
    caretaker_id: i64,
  ) -> impl Future<Output = Result<Vec<IncomingApplication>, Self::Error>> + Send + '_;

  /// Fetch a request visible to `user_id` (its adopter or the caretaker).
  fn get_application(
    &self,
    user_id: i64,
    id: i64,
  ) -> impl Future<Output = Result<AdoptionRequest, Self::Error>> + Send + '_;

  /// Transition a request's status on behalf of the listing's caretaker.
  ///
  /// The ownership guard, the transition check, the status write and (for
  /// `Approved`) the listing's move to `Hold` commit atomically.
  fn set_request_status(
    &self,
    caretaker_id: i64,
    id: i64,
    status: RequestStatus,
  ) -> impl Future<Output = Result<AdoptionRequest, Self::Error>> + Send + '_;

  /// Withdraw a still-pending application (adopter only).
  fn withdraw_application(
    &self,
    adopter_id: i64,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Messages ──────────────────────────────────────────────────────────

  fn send_message(
    &self,
    sender_id: i64,
    request_id: i64,
    content: String,
  ) -> impl Future<Output = Result<Message, Self::Error>> + Send + '_;

  /// All messages on a request, oldest first. Marks the other participant's
  /// messages as read.
  fn list_messages(
    &self,
    reader_id: i64,
    request_id: i64,
  ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + '_;

  /// Unread messages addressed to `user_id` across all their requests.
  fn unread_count(
    &self,
    user_id: i64,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Owned pets ────────────────────────────────────────────────────────

  fn create_pet(
    &self,
    owner_id: i64,
    input: NewPet,
  ) -> impl Future<Output = Result<Pet, Self::Error>> + Send + '_;

  fn list_pets(
    &self,
    owner_id: i64,
  ) -> impl Future<Output = Result<Vec<Pet>, Self::Error>> + Send + '_;

  fn get_pet(
    &self,
    owner_id: i64,
    id: i64,
  ) -> impl Future<Output = Result<Pet, Self::Error>> + Send + '_;

  fn update_pet(
    &self,
    owner_id: i64,
    id: i64,
    update: PetUpdate,
  ) -> impl Future<Output = Result<Pet, Self::Error>> + Send + '_;

  /// Delete a pet and its records. Returns stored medical filenames.
  fn delete_pet(
    &self,
    owner_id: i64,
    id: i64,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  fn add_medical_file(
    &self,
    owner_id: i64,
    pet_id: i64,
    file: NewMedicalFile,
  ) -> impl Future<Output = Result<MedicalFile, Self::Error>> + Send + '_;

  fn list_medical_files(
    &self,
    owner_id: i64,
    pet_id: i64,
  ) -> impl Future<Output = Result<Vec<MedicalFile>, Self::Error>> + Send + '_;

  /// Returns the stored filename of the removed record.
  fn delete_medical_file(
    &self,
    owner_id: i64,
    pet_id: i64,
    file_id: i64,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + '_;

  fn add_stat(
    &self,
    owner_id: i64,
    pet_id: i64,
    input: NewHealthStat,
  ) -> impl Future<Output = Result<HealthStat, Self::Error>> + Send + '_;

  /// Stats ordered by `recorded_on`, optionally for one metric.
  fn list_stats(
    &self,
    owner_id: i64,
    pet_id: i64,
    metric: Option<StatMetric>,
  ) -> impl Future<Output = Result<Vec<HealthStat>, Self::Error>> + Send + '_;

  fn delete_stat(
    &self,
    owner_id: i64,
    pet_id: i64,
    stat_id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Admin ─────────────────────────────────────────────────────────────

  fn dashboard_counts(
    &self,
  ) -> impl Future<Output = Result<DashboardCounts, Self::Error>> + Send + '_;

  fn list_users(
    &self,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  fn set_admin(
    &self,
    user_id: i64,
    is_admin: bool,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;
}
