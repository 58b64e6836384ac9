//! Fixed vocabulary shared by the policy table, classifier, and filters.

/// Well-known access tags attached to resources.
pub mod tags {
    pub const CONTENT: &str = "content";
    pub const META_CONTENT: &str = "meta-content";
    pub const OPEN_ACCESS: &str = "open-access";
    pub const PUBLISHABLE: &str = "publishable";
    pub const DOWNLOADABLE: &str = "downloadable";
    pub const DERIVABLE: &str = "derivable";
    pub const TRANSLATION_PROJECT: &str = "translation-project";
    pub const GENERIC_TRANSLATION: &str = "generic-translation";
    pub const RESEARCH_USE: &str = "research-use";
    pub const USER: &str = "user";
}

/// Permission keywords scoped within a tag's rule set.
pub mod permissions {
    pub const CREATE: &str = "create";
    pub const EDIT: &str = "edit";
    pub const READ: &str = "read";
    pub const PROCESS: &str = "process";
    pub const READ_VIA_API: &str = "read-via-api";
    pub const READ_VIA_VACHANADMIN: &str = "read-via-vachanadmin";
    pub const VIEW_ON_WEB: &str = "view-on-web";
    pub const DOWNLOAD_N_SAVE: &str = "download-n-save";
    pub const TRANSLATE: &str = "translate";
    pub const REFER_FOR_TRANSLATION: &str = "refer-for-translation";
    pub const CREATE_USER: &str = "create-user";
    pub const EDIT_SETTINGS: &str = "edit-settings";
    pub const READ_SETTINGS: &str = "read-settings";
    pub const EDIT_DRAFT: &str = "edit-draft";
    pub const READ_DRAFT: &str = "read-draft";
    pub const VIEW_PROJECT: &str = "view-project";
    pub const LOGIN: &str = "login";
    pub const LOGOUT: &str = "logout";
    pub const EDIT_ROLE: &str = "edit-role";
    pub const EDIT_DATA: &str = "edit-data";
    pub const VIEW_PROFILE: &str = "view-profile";
    // Spelling matches the deployed permission map.
    pub const DELETE_OR_DEACTIVATE: &str = "detele/deactivate";

    /// Permissions whose subject is always the caller's own account.
    pub const SELF_SERVICE: &[&str] = &[LOGOUT];
}

/// Role names, static (from the identity provider) and dynamic (resolved per request).
pub mod roles {
    pub const SUPER_ADMIN: &str = "SuperAdmin";
    pub const VACHAN_ADMIN: &str = "VachanAdmin";
    pub const VACHAN_USER: &str = "VachanUser";
    pub const AG_ADMIN: &str = "AgAdmin";
    pub const AG_USER: &str = "AgUser";
    pub const BCS_DEVELOPER: &str = "BcsDeveloper";
    pub const API_USER: &str = "APIUser";
    pub const REGISTERED_USER: &str = "registeredUser";
    pub const NO_AUTH_REQUIRED: &str = "noAuthRequired";
    pub const RESOURCE_CREATED_USER: &str = "resourceCreatedUser";
    pub const CREATED_USER: &str = "createdUser";
    pub const PROJECT_OWNER: &str = "projectOwner";
    pub const PROJECT_MEMBER: &str = "projectMember";
}

/// Endpoint prefixes that select resource types and mediation paths.
pub const AUTOGRAPHA_PREFIX: &str = "/v2/autographa";
pub const PROJECT_PREFIX: &str = "/v2/autographa/project";
pub const SINGLE_PROJECT_PREFIX: &str = "/v2/autographa/project/";
pub const USER_PREFIX: &str = "/v2/user";
pub const TRANSLATION_PREFIX: &str = "/v2/translation";

/// The unfiltered "list all sources" endpoint; an empty visible set is not a denial here.
pub const SOURCES_LISTING_ENDPOINT: &str = "/v2/sources";

/// Trailing path segments that identify metadata collections.
pub const METACONTENT_SEGMENTS: [&str; 4] = ["contents", "languages", "licenses", "versions"];

/// Primary content-source kinds whose POST requires created-user identity.
pub const SOURCE_CONTENT_KINDS: [&str; 5] = [
    "bibles",
    "commentaries",
    "dictionaries",
    "infographics",
    "biblevideos",
];

/// Index of the resource segment in `"/v2/<resource>/..."` after splitting on `/`.
pub const RESOURCE_SEGMENT_INDEX: usize = 2;
