// Code generated by Wire protocol buffer compiler, do not edit.
// Source file: squareup/address_book.proto

/// An entry in the address book.
#[derive(Clone, Debug, ::wire::Message)]
#[wire(name = "squareup.Person")]
pub struct Person {
    /// The person's full name.
    #[wire(tag = 1, kind = "string", required)]
    name: Option<String>,
    #[wire(tag = 2, kind = "int32", required)]
    id: Option<i32>,
    #[wire(tag = 3, kind = "string")]
    email: Option<String>,
    #[wire(tag = 4, kind = "message")]
    phones: ::wire::Repeated<crate::squareup::person::PhoneNumber>,
    #[wire(tag = 5, kind = "sint32", packed)]
    lucky_numbers: ::wire::Repeated<i32>,
    #[wire(unknown_fields)]
    unknown_fields: ::wire::UnknownFields,
    #[wire(hash_cache)]
    cached_hash: ::wire::HashCache,
}
impl Person {
    pub const DEFAULT_NAME: &str = "";
    pub const DEFAULT_ID: i32 = 0;
    pub const DEFAULT_EMAIL: &str = "";
}
/// Types declared inside `squareup.Person`
pub mod person {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ::wire::Enum)]
    #[wire(name = "squareup.Person.PhoneType")]
    pub enum PhoneType {
        Mobile = 0,
        Home = 1,
        Work = 2,
    }
    #[derive(Clone, Debug, ::wire::Message)]
    #[wire(name = "squareup.Person.PhoneNumber")]
    pub struct PhoneNumber {
        #[wire(tag = 1, kind = "string", required)]
        number: Option<String>,
        #[wire(tag = 2, kind = "enum")]
        r#type: Option<crate::squareup::person::PhoneType>,
        #[wire(unknown_fields)]
        unknown_fields: ::wire::UnknownFields,
        #[wire(hash_cache)]
        cached_hash: ::wire::HashCache,
    }
    impl PhoneNumber {
        pub const DEFAULT_NUMBER: &str = "";
        pub const DEFAULT_TYPE: crate::squareup::person::PhoneType = crate::squareup::person::PhoneType::Home;
    }
}
