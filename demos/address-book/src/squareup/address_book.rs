// Code generated by Wire protocol buffer compiler, do not edit.
// Source file: squareup/address_book.proto

#[derive(Clone, Debug, ::wire::Message)]
#[wire(name = "squareup.AddressBook")]
pub struct AddressBook {
    #[wire(tag = 1, kind = "message")]
    people: ::wire::Repeated<crate::squareup::Person>,
    #[deprecated]
    #[wire(tag = 2, kind = "string")]
    legacy_owner: Option<String>,
    #[wire(unknown_fields)]
    unknown_fields: ::wire::UnknownFields,
    #[wire(hash_cache)]
    cached_hash: ::wire::HashCache,
}
impl AddressBook {
    pub const DEFAULT_LEGACY_OWNER: &str = "";
    pub const MESSAGE_OPTIONS: &[(&str, &str)] = &[("(squareup.owner)", "contacts")];
}
