//! Integration tests for masking and mask-aware loading.

use std::sync::Arc;

use fieldmask::{
    extract_mask, parse_fields, prune_fields, MaskContext, MaskError, MaskParams, OptimizedView,
    PredicateRegistry, PredicateTable, Schema,
};
use serde_json::{json, Value};

/// Stand-in for an ORM query: remembers which related sets it prefetches.
#[derive(Debug, Clone, Default, PartialEq)]
struct TicketQuery {
    prefetch: Vec<&'static str>,
}

impl TicketQuery {
    fn prefetch_related(mut self, relation: &'static str) -> Self {
        self.prefetch.push(relation);
        self
    }

    /// One query for the tickets plus one per prefetched relation.
    fn num_queries(&self) -> usize {
        1 + self.prefetch.len()
    }
}

struct TicketView;

impl OptimizedView for TicketView {
    type Collection = TicketQuery;

    fn predicates() -> &'static PredicateRegistry<TicketQuery> {
        static TABLE: PredicateTable<TicketQuery> = PredicateTable::new();
        TABLE.get_or_init(|| {
            PredicateRegistry::builder()
                .predicate(&["author"], |q: TicketQuery| q.prefetch_related("author"))
                .predicate(&["comments"], |q: TicketQuery| {
                    q.prefetch_related("comments")
                })
                .predicate(&["comments.author"], |q: TicketQuery| {
                    q.prefetch_related("comments__author")
                })
                .build()
        })
    }
}

fn ticket_schema() -> Schema {
    let user = Arc::new(Schema::new().value("username").value("email"));
    let comment = Arc::new(Schema::new().value("body").object("author", user.clone()));
    Schema::new()
        .value("title")
        .value("body")
        .object("author", user)
        .many("comments", comment)
}

fn tickets() -> Vec<Value> {
    vec![
        json!({
            "title": "t1",
            "body": "b1",
            "author": { "username": "ana", "email": "ana@example.org" },
            "comments": [
                { "body": "c1", "author": { "username": "bo", "email": "bo@example.org" } },
                { "body": "c2", "author": { "username": "ana", "email": "ana@example.org" } }
            ]
        }),
        json!({
            "title": "t2",
            "body": "b2",
            "author": { "username": "cy", "email": "cy@example.org" },
            "comments": []
        }),
    ]
}

fn get(query: &str) -> Result<(Value, TicketQuery), MaskError> {
    let ctx = extract_mask(query, &MaskParams::default())?;
    let loaded = TicketView::optimize(TicketQuery::default(), &ctx);
    let data = ticket_schema().serialize_many(&tickets(), &ctx);
    Ok((data, loaded))
}

mod views {
    use super::*;

    #[test]
    fn plain() {
        let (data, _) = get("").unwrap();
        assert_eq!(data, Value::Array(tickets()));
    }

    #[test]
    fn no_comments() {
        let (data, _) = get("excludes=comments").unwrap();
        assert_eq!(
            data,
            json!([
                {
                    "title": "t1",
                    "body": "b1",
                    "author": { "username": "ana", "email": "ana@example.org" }
                },
                {
                    "title": "t2",
                    "body": "b2",
                    "author": { "username": "cy", "email": "cy@example.org" }
                }
            ])
        );
    }

    #[test]
    fn nested() {
        let (data, _) = get("fields=title,author/username").unwrap();
        assert_eq!(
            data,
            json!([
                { "title": "t1", "author": { "username": "ana" } },
                { "title": "t2", "author": { "username": "cy" } }
            ])
        );
    }

    #[test]
    fn nested_exclusion_inside_list() {
        let (data, _) = get("excludes=comments/author").unwrap();
        assert_eq!(data[0]["comments"], json!([{ "body": "c1" }, { "body": "c2" }]));
        assert_eq!(data[0]["author"]["username"], "ana");
    }

    #[test]
    fn both_params_rejected() {
        let err = get("fields=title&excludes=body").unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("fields"));
        assert!(err.to_string().contains("excludes"));
    }
}

mod performance {
    use super::*;

    #[test]
    fn default_num_queries() {
        let (_, loaded) = get("").unwrap();
        assert_eq!(loaded.prefetch, ["author", "comments", "comments__author"]);
        assert_eq!(loaded.num_queries(), 4);
    }

    #[test]
    fn pruned_num_queries() {
        let (data, loaded) = get("fields=title,body").unwrap();
        assert_eq!(loaded.num_queries(), 1);
        assert!(data[0].get("comments").is_none());
        assert!(data[0].get("author").is_none());
    }

    #[test]
    fn author_only() {
        let (_, loaded) = get("fields=title,body,author").unwrap();
        assert_eq!(loaded.prefetch, ["author"]);
    }

    #[test]
    fn partially_pruned() {
        let (_, loaded) = get("fields=title,body,author,comments/body").unwrap();
        assert_eq!(loaded.prefetch, ["author", "comments"]);
        assert_eq!(loaded.num_queries(), 3);
    }

    #[test]
    fn excluded_comments_skip_comment_loaders() {
        let (data, loaded) = get("excludes=comments").unwrap();
        assert_eq!(loaded.prefetch, ["author"]);
        assert!(data[0].get("title").is_some());
        assert!(data[0].get("author").is_some());
        assert!(data[0].get("comments").is_none());
    }

    #[test]
    fn registry_is_shared_across_requests() {
        let first = TicketView::predicates() as *const _;
        let second = TicketView::predicates() as *const _;
        assert_eq!(first, second);
    }
}

mod settings {
    use super::*;

    fn get_with(query: &str, params: &MaskParams) -> Value {
        let ctx = extract_mask(query, params).unwrap();
        ticket_schema().serialize_many(&tickets(), &ctx)
    }

    #[test]
    fn old_fields_name_is_inert() {
        let params = MaskParams::new().fields_name("asdf");
        let data = get_with("fields=title,body", &params);
        assert!(data[0].get("author").is_some());
        assert!(data[0].get("comments").is_some());
    }

    #[test]
    fn override_fields_name() {
        let params = MaskParams::new().fields_name("asdf");
        let data = get_with("asdf=title,body", &params);
        assert!(data[0].get("author").is_none());
        assert!(data[0].get("comments").is_none());
    }

    #[test]
    fn old_excludes_name_is_inert() {
        let params = MaskParams::new().excludes_name("asdf");
        let data = get_with("excludes=title,body", &params);
        assert!(data[0].get("title").is_some());
        assert!(data[0].get("body").is_some());
    }

    #[test]
    fn override_excludes_name() {
        let params = MaskParams::new().excludes_name("asdf");
        let data = get_with("asdf=title,body", &params);
        assert!(data[0].get("title").is_none());
        assert!(data[0].get("body").is_none());
    }
}

mod properties {
    use super::*;

    #[test]
    fn empty_mask_prunes_nothing() {
        let schema = ticket_schema();
        let ctx = MaskContext::including(parse_fields(None::<&str>));
        assert_eq!(prune_fields(schema.fields(), &ctx).len(), 4);
    }

    #[test]
    fn serializing_masked_output_again_is_stable() {
        let ctx = MaskContext::including(parse_fields("title,comments/author/username"));
        let schema = ticket_schema();
        let once = schema.serialize(&tickets()[0], &ctx);

        let partial = Arc::new(Schema::new().value("username"));
        let comment = Arc::new(Schema::new().object("author", partial));
        let pruned_schema = Schema::new().value("title").many("comments", comment);
        let twice = pruned_schema.serialize(&once, &ctx);

        assert_eq!(once, twice);
    }

    #[test]
    fn unknown_fields_are_silently_absent() {
        let (data, loaded) = get("fields=title,nonexistent/deeper").unwrap();
        assert_eq!(data, json!([{ "title": "t1" }, { "title": "t2" }]));
        assert_eq!(loaded.num_queries(), 1);
    }
}
