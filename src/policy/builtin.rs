//! Policy deployed with the gateway.

use crate::constants::permissions::{
    CREATE, CREATE_USER, DELETE_OR_DEACTIVATE, DOWNLOAD_N_SAVE, EDIT, EDIT_DATA, EDIT_DRAFT,
    EDIT_ROLE, EDIT_SETTINGS, LOGIN, LOGOUT, PROCESS, READ, READ_DRAFT, READ_SETTINGS,
    READ_VIA_API, READ_VIA_VACHANADMIN, REFER_FOR_TRANSLATION, TRANSLATE, VIEW_ON_WEB,
    VIEW_PROFILE, VIEW_PROJECT,
};
use crate::constants::roles::{
    AG_ADMIN, AG_USER, BCS_DEVELOPER, CREATED_USER, NO_AUTH_REQUIRED, PROJECT_MEMBER,
    PROJECT_OWNER, REGISTERED_USER, RESOURCE_CREATED_USER, SUPER_ADMIN, VACHAN_ADMIN,
    VACHAN_USER,
};
use crate::constants::tags;

use super::table::{PermissionRules, PolicyTable, RoleRule};

type Entry = (&'static str, &'static [&'static str]);

const META_CONTENT: &[Entry] = &[
    (CREATE, &[REGISTERED_USER]),
    (EDIT, &[SUPER_ADMIN, RESOURCE_CREATED_USER]),
    (READ_VIA_API, &[NO_AUTH_REQUIRED]),
    (VIEW_ON_WEB, &[NO_AUTH_REQUIRED]),
    (REFER_FOR_TRANSLATION, &[REGISTERED_USER]),
];

// Default tag for every row of the sources table.
const CONTENT: &[Entry] = &[
    (READ_VIA_API, &[SUPER_ADMIN, VACHAN_ADMIN, BCS_DEVELOPER]),
    (READ_VIA_VACHANADMIN, &[SUPER_ADMIN, VACHAN_ADMIN]),
    (CREATE, &[SUPER_ADMIN, VACHAN_ADMIN]),
    (EDIT, &[SUPER_ADMIN, RESOURCE_CREATED_USER]),
];

const OPEN_ACCESS: &[Entry] = &[
    (READ_VIA_API, &[NO_AUTH_REQUIRED]),
    (VIEW_ON_WEB, &[NO_AUTH_REQUIRED]),
    (REFER_FOR_TRANSLATION, &[SUPER_ADMIN, AG_ADMIN, AG_USER]),
    (TRANSLATE, &[SUPER_ADMIN, AG_ADMIN, AG_USER]),
];

const PUBLISHABLE: &[Entry] = &[
    (READ_VIA_API, &[REGISTERED_USER]),
    (VIEW_ON_WEB, &[NO_AUTH_REQUIRED]),
    (REFER_FOR_TRANSLATION, &[SUPER_ADMIN, AG_ADMIN, AG_USER]),
];

const DOWNLOADABLE: &[Entry] = &[(DOWNLOAD_N_SAVE, &[SUPER_ADMIN, VACHAN_ADMIN, VACHAN_USER])];

const DERIVABLE: &[Entry] = &[(TRANSLATE, &[SUPER_ADMIN, AG_ADMIN, AG_USER])];

// Default tag for every Autographa project.
const TRANSLATION_PROJECT: &[Entry] = &[
    (CREATE, &[SUPER_ADMIN, AG_ADMIN, AG_USER]),
    (CREATE_USER, &[SUPER_ADMIN, AG_ADMIN, PROJECT_OWNER]),
    (EDIT_SETTINGS, &[SUPER_ADMIN, AG_ADMIN, PROJECT_OWNER]),
    (
        READ_SETTINGS,
        &[SUPER_ADMIN, AG_ADMIN, PROJECT_OWNER, PROJECT_MEMBER],
    ),
    (
        EDIT_DRAFT,
        &[SUPER_ADMIN, AG_ADMIN, PROJECT_OWNER, PROJECT_MEMBER],
    ),
    (
        READ_DRAFT,
        &[SUPER_ADMIN, AG_ADMIN, PROJECT_OWNER, PROJECT_MEMBER, BCS_DEVELOPER],
    ),
    (
        VIEW_PROJECT,
        &[SUPER_ADMIN, AG_ADMIN, PROJECT_OWNER, PROJECT_MEMBER, BCS_DEVELOPER],
    ),
];

const GENERIC_TRANSLATION: &[Entry] = &[
    (READ, &[REGISTERED_USER]),
    (CREATE, &[REGISTERED_USER]),
    (PROCESS, &[REGISTERED_USER]),
];

const RESEARCH_USE: &[Entry] = &[(READ, &[SUPER_ADMIN, BCS_DEVELOPER])];

// Default tag for every identity held by the identity provider.
const USER: &[Entry] = &[
    (CREATE, &[NO_AUTH_REQUIRED]),
    (EDIT_ROLE, &[SUPER_ADMIN]),
    (EDIT_DATA, &[SUPER_ADMIN, CREATED_USER]),
    (VIEW_PROFILE, &[SUPER_ADMIN, CREATED_USER]),
    (LOGIN, &[NO_AUTH_REQUIRED]),
    (LOGOUT, &[CREATED_USER]),
    (DELETE_OR_DEACTIVATE, &[SUPER_ADMIN]),
];

const BUILTIN: &[(&str, &[Entry])] = &[
    (tags::META_CONTENT, META_CONTENT),
    (tags::CONTENT, CONTENT),
    (tags::OPEN_ACCESS, OPEN_ACCESS),
    (tags::PUBLISHABLE, PUBLISHABLE),
    (tags::DOWNLOADABLE, DOWNLOADABLE),
    (tags::DERIVABLE, DERIVABLE),
    (tags::TRANSLATION_PROJECT, TRANSLATION_PROJECT),
    (tags::GENERIC_TRANSLATION, GENERIC_TRANSLATION),
    (tags::RESEARCH_USE, RESEARCH_USE),
    (tags::USER, USER),
];

impl PolicyTable {
    /// The policy the gateway ships with.
    #[must_use]
    pub fn builtin() -> Self {
        let rules = BUILTIN
            .iter()
            .map(|(tag, permissions)| {
                let compiled: PermissionRules = permissions
                    .iter()
                    .map(|(permission, allowed)| {
                        let allowed: Vec<RoleRule> =
                            allowed.iter().copied().map(RoleRule::parse).collect();
                        ((*permission).to_string(), allowed)
                    })
                    .collect();
                ((*tag).to_string(), compiled)
            })
            .collect();
        Self { rules }
    }
}
