//! Integration tests for the access rules the gateway relies on.
//!
//! Each test drives [`AccessEngine::decide_access`] through the builtin policy
//! and route table, the way the gateway does for a live request.

use vachan_access_core::{
    AccessEngine, App, CallerIdentity, InMemoryStore, PolicyTable, ProjectUser, RequestContext,
    ResourceEntry, ResourceInput, RoutePermissionMap,
};

type Engine = AccessEngine<RoutePermissionMap, InMemoryStore>;

fn builtin_engine() -> Engine {
    AccessEngine::new(
        PolicyTable::builtin(),
        RoutePermissionMap::builtin(),
        InMemoryStore::new(),
    )
}

fn allowed(
    engine: &Engine,
    ctx: &RequestContext,
    caller: &CallerIdentity,
    record: &ResourceEntry,
) -> bool {
    engine
        .decide_access(ctx, caller, None, ResourceInput::Single(record))
        .expect("decision")
        .allowed
}

fn visible_subset(
    engine: &Engine,
    ctx: &RequestContext,
    caller: &CallerIdentity,
    candidates: Vec<ResourceEntry>,
) -> Vec<ResourceEntry> {
    let decision = engine
        .decide_access(ctx, caller, None, ResourceInput::Collection(&candidates))
        .expect("decision");
    decision.retain_visible(candidates)
}

#[test]
fn undefined_permission_grants_nothing_without_another_tag() {
    let engine = builtin_engine();
    let ctx = RequestContext::new("PUT", "/v2/sources");
    let superadmin = CallerIdentity::authenticated("U1", ["SuperAdmin"]);

    let downloadable_only = ResourceEntry::content("a", ["downloadable"]).created_by("U1");
    assert!(!allowed(&engine, &ctx, &superadmin, &downloadable_only));

    let with_content = ResourceEntry::content("b", ["downloadable", "content"]);
    assert!(allowed(&engine, &ctx, &superadmin, &with_content));
}

#[test]
fn anonymous_caller_reaches_open_resources() {
    let engine = builtin_engine();
    let anonymous = CallerIdentity::anonymous(None);

    let ctx = RequestContext::new("GET", "/v2/languages");
    let decision = engine
        .decide_access::<ResourceEntry>(&ctx, &anonymous, None, ResourceInput::None)
        .expect("decision");
    assert!(decision.allowed);
    assert_eq!(decision.required_permission, "read-via-api");

    let ctx = RequestContext::new("GET", "/v2/bibles/en_KJV_1_bible/books");
    let open = vec![ResourceEntry::content("en_KJV_1_bible", ["content", "open-access"])];
    assert_eq!(visible_subset(&engine, &ctx, &anonymous, open.clone()), open);
}

#[test]
fn metadata_edit_is_owner_only() {
    let engine = builtin_engine();
    let ctx = RequestContext::new("PUT", "/v2/languages");
    let language = ResourceEntry::content("ml", Vec::<String>::new()).created_by("U1");

    let owner = CallerIdentity::authenticated("U1", ["VachanUser"]);
    let stranger = CallerIdentity::authenticated("U2", ["VachanUser"]);
    let superadmin = CallerIdentity::authenticated("U3", ["SuperAdmin"]);

    let decision = engine
        .decide_access(&ctx, &owner, None, ResourceInput::Single(&language))
        .expect("decision");
    assert_eq!(decision.access_tags, ["meta-content", "open-access"]);
    assert_eq!(decision.required_permission, "edit");
    assert!(decision.allowed);
    assert!(!allowed(&engine, &ctx, &stranger, &language));
    assert!(allowed(&engine, &ctx, &superadmin, &language));
}

#[test]
fn literal_role_post_on_source_content_requires_creator() {
    let engine = builtin_engine();
    let ctx = RequestContext::new("POST", "/v2/bibles");
    let admin = CallerIdentity::authenticated("U1", ["VachanAdmin"]);

    let own = ResourceEntry::content("hi_IRV_1_bible", ["content"]).created_by("U1");
    let foreign = ResourceEntry::content("hi_IRV_1_bible", ["content"]).created_by("U9");
    assert!(allowed(&engine, &ctx, &admin, &own));
    assert!(!allowed(&engine, &ctx, &admin, &foreign));

    // The same role on a non-source route is not downgraded.
    let sources = RequestContext::new("POST", "/v2/sources");
    assert!(allowed(&engine, &sources, &admin, &foreign));

    // SuperAdmin is exempt from the creator check.
    let superadmin = CallerIdentity::authenticated("U2", ["SuperAdmin"]);
    assert!(allowed(&engine, &ctx, &superadmin, &foreign));
}

#[test]
fn content_filtering_is_idempotent() {
    const TAGS: [&str; 7] = [
        "content",
        "open-access",
        "publishable",
        "downloadable",
        "derivable",
        "research-use",
        "made-up-tag",
    ];
    const ROLES: [&str; 6] = [
        "SuperAdmin",
        "VachanAdmin",
        "AgUser",
        "BcsDeveloper",
        "APIUser",
        "VachanUser",
    ];
    let engine = builtin_engine();
    let mut rng = fastrand::Rng::with_seed(0x5eed_ac1);

    for round in 0..64 {
        let candidates: Vec<ResourceEntry> = (0..rng.usize(1..24))
            .map(|i| {
                let tags: Vec<&str> = TAGS.iter().copied().filter(|_| rng.bool()).collect();
                ResourceEntry::content(format!("source-{i}"), tags)
            })
            .collect();
        let caller = if rng.bool() {
            let roles: Vec<&str> = ROLES.iter().copied().filter(|_| rng.u8(..4) == 0).collect();
            CallerIdentity::authenticated(format!("U{round}"), roles)
        } else {
            CallerIdentity::anonymous(None)
        };
        let app = App::ALL[rng.usize(..App::ALL.len())].as_str();
        let ctx = RequestContext::new("GET", "/v2/sources").with_app(app);

        let once = visible_subset(&engine, &ctx, &caller, candidates);
        let twice = visible_subset(&engine, &ctx, &caller, once.clone());
        assert_eq!(once, twice, "round {round} shrank on re-filtering");
    }
}

#[test]
fn project_listing_falls_back_to_membership_rows() {
    let engine = builtin_engine();
    let ctx = RequestContext::new("GET", "/v2/autographa/projects").with_app("Autographa");
    let caller = CallerIdentity::authenticated("U1", ["AgUser"]);
    let p1 = ResourceEntry::project(1, vec![ProjectUser::new("U1", "projectMember")]);
    let p2 = ResourceEntry::project(2, vec![ProjectUser::new("U2", "projectOwner")]);

    let visible = visible_subset(&engine, &ctx, &caller, vec![p1.clone(), p2.clone()]);
    assert_eq!(visible, vec![p1.clone()]);

    let admin = CallerIdentity::authenticated("U7", ["AgAdmin"]);
    let visible = visible_subset(&engine, &ctx, &admin, vec![p1.clone(), p2.clone()]);
    assert_eq!(visible, vec![p1, p2]);
}

#[test]
fn untagged_content_is_invisible_and_immutable() {
    let engine = builtin_engine();
    let superadmin = CallerIdentity::authenticated("U1", ["SuperAdmin"]);
    let untagged = ResourceEntry::content("orphan", Vec::<String>::new()).created_by("U1");

    let read = RequestContext::new("GET", "/v2/bibles/orphan/books");
    let decision = engine
        .decide_access(
            &read,
            &superadmin,
            None,
            ResourceInput::Collection(std::slice::from_ref(&untagged)),
        )
        .expect("decision");
    assert_eq!(decision.visible, Some(Vec::new()));
    assert!(!decision.allowed);

    let write = RequestContext::new("PUT", "/v2/sources");
    assert!(!allowed(&engine, &write, &superadmin, &untagged));
}

#[test]
fn unknown_tags_are_ignored() {
    let engine = builtin_engine();
    assert!(engine.policy().permissions_for("nonexistent-tag").is_empty());

    let anonymous = CallerIdentity::anonymous(None);
    let ctx = RequestContext::new("GET", "/v2/dictionaries/en_EBD_1_dictionary");
    let candidates = vec![
        ResourceEntry::content("unknown", ["nonexistent-tag"]),
        ResourceEntry::content("mixed", ["nonexistent-tag", "open-access"]),
    ];
    let visible = visible_subset(&engine, &ctx, &anonymous, candidates.clone());
    assert_eq!(visible, vec![candidates[1].clone()]);

    let write = RequestContext::new("PUT", "/v2/sources");
    let superadmin = CallerIdentity::authenticated("U1", ["SuperAdmin"]);
    assert!(!allowed(&engine, &write, &superadmin, &candidates[0]));
}

#[test]
fn identity_failure_reads_only_open_content() {
    let engine = builtin_engine();
    let expired = CallerIdentity::anonymous(Some(
        vachan_access_core::IdentityFailure::Unauthorized("token expired".to_string()),
    ));
    let ctx = RequestContext::new("GET", "/v2/sources").with_app(App::VachanOnline.as_str());
    let candidates = vec![
        ResourceEntry::content("public", ["content", "open-access"]),
        ResourceEntry::content("private", ["content"]),
    ];
    let visible = visible_subset(&engine, &ctx, &expired, candidates.clone());
    assert_eq!(visible, vec![candidates[0].clone()]);
}

#[test]
fn sources_listing_tolerates_trailing_slash() {
    let engine = builtin_engine();
    let anonymous = CallerIdentity::anonymous(None);
    let private = vec![ResourceEntry::content("private", ["content"])];

    for endpoint in ["/v2/sources", "/v2/sources/"] {
        let ctx = RequestContext::new("GET", endpoint);
        let decision = engine
            .decide_access(&ctx, &anonymous, None, ResourceInput::Collection(&private))
            .expect("decision");
        assert_eq!(decision.required_permission, "read-via-api");
        assert!(decision.allowed, "{endpoint} refused an empty listing");
        assert_eq!(decision.visible, Some(Vec::new()));
    }
}
