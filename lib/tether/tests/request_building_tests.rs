//! Method-level handlers bound through a service.

use std::collections::BTreeMap;

use assert2::{check, let_assert};
use serde::Serialize;
use tether::handler::{
    Body, Field, FieldMap, Header, HeaderMap, ParameterHandler, Part, PartMap, Path, Query,
    QueryMap, RawPart, RelativeUrl,
};
use tether::{
    BoxError, ClassAnnotation, FormConverter, JsonConverter, Method, MethodDefinition,
    RequestBody, Service, ServiceConfig, ServiceMetadata, StaticParams, TextConverter,
    ToStringConverter,
};

fn service(metadata: ServiceMetadata) -> Service {
    Service::builder(metadata)
        .base_url("http://example.com/")
        .provider(StaticParams::new().query("userid", "7"))
        .build()
        .expect("build")
}

fn plain() -> Service {
    service(ServiceMetadata::new("Example"))
}

fn body_text(request: &tether::Request) -> String {
    let_assert!(Some(body) = request.body());
    String::from_utf8(body.to_vec()).expect("utf-8")
}

#[test]
fn path_and_query() {
    let service = plain();
    service
        .method("get", |_| {
            Ok(MethodDefinition::new(Method::Get, "/users/{id}/posts")
                .param::<String, _>(Path::new("id", ToStringConverter, false))
                .param::<u32, _>(Query::new("page", ToStringConverter, false)))
        })
        .expect("method");

    let id = "a b/c".to_string();
    let page = 2_u32;
    let request = service
        .request("get", &[Some(&id), Some(&page)])
        .expect("request");
    check!(request.url().as_str() == "http://example.com/users/a%20b%2Fc/posts?page=2");
}

#[test]
fn unresolved_path_template_is_rejected() {
    let service = plain();
    service
        .method("get", |_| Ok(MethodDefinition::new(Method::Get, "/{id}")))
        .expect("method");

    let_assert!(Err(err) = service.request("get", &[]));
    check!(err.to_string() == "invalid request: missing value for path parameter \"id\"");
}

#[test]
fn null_path_is_rejected() {
    let service = plain();
    service
        .method("get", |_| {
            Ok(MethodDefinition::new(Method::Get, "/users/{id}")
                .param::<String, _>(Path::new("id", ToStringConverter, false)))
        })
        .expect("method");

    let_assert!(Err(err) = service.request("get", &[None]));
    check!(err.is_validation());
    check!(err.to_string() == "Path parameter \"id\" value must not be null.");
}

#[test]
fn iterable_and_array_queries() {
    let service = plain();
    service
        .method("search", |_| {
            Ok(MethodDefinition::new(Method::Get, "/search")
                .param::<Vec<String>, _>(Query::new("tag", ToStringConverter, false).iterable())
                .param::<[i32; 2], _>(Query::new("range", ToStringConverter, false).array()))
        })
        .expect("method");

    let tags = vec!["a".to_string(), "b".to_string()];
    let range = [1, 5];
    let request = service
        .request("search", &[Some(&tags), Some(&range)])
        .expect("request");
    check!(request.url().query() == Some("tag=a&tag=b&range=1&range=5"));

    // a null sequence is skipped entirely
    let request = service.request("search", &[None, None]).expect("request");
    check!(request.url().query() == None);
}

#[test]
fn nullable_elements() {
    let service = plain();
    service
        .method("search", |_| {
            let handler: tether::handler::Iterable<_, String> =
                Query::new("tag", ToStringConverter, false).iterable();
            Ok(MethodDefinition::new(Method::Get, "/search")
                .param::<Vec<Option<String>>, _>(handler))
        })
        .expect("method");

    let tags = vec![Some("a".to_string()), None, Some("c".to_string())];
    let request = service.request("search", &[Some(&tags)]).expect("request");
    check!(request.url().query() == Some("tag=a&tag=c"));
}

#[test]
fn header_and_header_map() {
    let service = plain();
    service
        .method("get", |_| {
            Ok(MethodDefinition::new(Method::Get, "/foo")
                .header("Accept: text/plain")
                .param::<String, _>(Header::new("X-Trace", ToStringConverter))
                .param::<BTreeMap<String, i32>, _>(HeaderMap::new(ToStringConverter)))
        })
        .expect("method");

    let trace = "abc".to_string();
    let extra = BTreeMap::from([("X-A".to_string(), 1), ("X-B".to_string(), 2)]);
    let request = service
        .request("get", &[Some(&trace), Some(&extra)])
        .expect("request");

    let names: Vec<&str> = request
        .headers()
        .iter()
        .map(|(name, _)| name.as_str())
        .collect();
    check!(names == vec!["Accept", "X-Trace", "X-A", "X-B"]);
    check!(request.header("X-B") == Some("2"));
}

#[test]
fn query_map_rejects_null_entries() {
    type Entries = Vec<(Option<String>, Option<String>)>;

    let service = plain();
    service
        .method("get", |_| {
            Ok(MethodDefinition::new(Method::Get, "/foo")
                .param::<Entries, _>(QueryMap::new(ToStringConverter, false)))
        })
        .expect("method");

    let_assert!(Err(err) = service.request("get", &[None]));
    check!(err.to_string() == "Query map was null.");

    let entries = vec![(Some("k".to_string()), None::<String>)];
    let_assert!(Err(err) = service.request("get", &[Some(&entries)]));
    check!(err.to_string() == "Query map contained null value for key 'k'.");

    let entries = vec![(None::<String>, Some("v".to_string()))];
    let_assert!(Err(err) = service.request("get", &[Some(&entries)]));
    check!(err.to_string() == "Query map contained null key.");
}

#[test]
fn form_fields() {
    let service = plain();
    service
        .method("login", |_| {
            Ok(MethodDefinition::new(Method::Post, "/login")
                .param::<String, _>(Field::new("user", ToStringConverter, false))
                .param::<BTreeMap<String, String>, _>(FieldMap::new(ToStringConverter, false)))
        })
        .expect("method");

    let user = "jo doe".to_string();
    let extra = BTreeMap::from([("remember".to_string(), "yes&no".to_string())]);
    let request = service
        .request("login", &[Some(&user), Some(&extra)])
        .expect("request");

    check!(request.header("Content-Type") == Some("application/x-www-form-urlencoded"));
    check!(body_text(&request) == "user=jo+doe&remember=yes%26no");
}

#[test]
fn json_body() {
    #[derive(Serialize)]
    struct NewUser {
        name: String,
    }

    let service = plain();
    service
        .method("create", |_| {
            Ok(MethodDefinition::new(Method::Post, "/users")
                .param::<NewUser, _>(Body::new(JsonConverter)))
        })
        .expect("method");

    let user = NewUser {
        name: "ada".to_string(),
    };
    let request = service.request("create", &[Some(&user)]).expect("request");
    check!(request.header("Content-Type") == Some("application/json"));
    check!(body_text(&request) == r#"{"name":"ada"}"#);

    let_assert!(Err(err) = service.request("create", &[None]));
    check!(err.to_string() == "Body parameter value must not be null.");
}

#[test]
fn form_body() {
    #[derive(Serialize)]
    struct Login {
        user: String,
        remember: bool,
    }

    let service = plain();
    service
        .method("login", |_| {
            Ok(MethodDefinition::new(Method::Post, "/login")
                .param::<Login, _>(Body::new(FormConverter)))
        })
        .expect("method");

    let login = Login {
        user: "jo doe".to_string(),
        remember: true,
    };
    let request = service.request("login", &[Some(&login)]).expect("request");
    check!(request.header("Content-Type") == Some("application/x-www-form-urlencoded"));
    check!(body_text(&request) == "user=jo+doe&remember=true");
}

#[test]
fn body_conversion_failure() {
    let service = plain();
    service
        .method("create", |_| {
            let handler = Body::new(|_: &String| -> Result<RequestBody, BoxError> {
                Err("refused".into())
            });
            Ok(MethodDefinition::new(Method::Post, "/users").param::<String, _>(handler))
        })
        .expect("method");

    let value = "x".to_string();
    let_assert!(Err(err) = service.request("create", &[Some(&value)]));
    check!(err.is_conversion());
}

#[test]
fn multipart_parts_use_configured_transfer_encoding() {
    let service = Service::builder(ServiceMetadata::new("Upload"))
        .base_url("http://example.com/")
        .config(ServiceConfig::builder().transfer_encoding("8bit").build())
        .build()
        .expect("build");
    service
        .method("upload", |config| {
            Ok(MethodDefinition::new(Method::Post, "/upload")
                .param::<String, _>(Part::form_data(
                    "title",
                    &config.transfer_encoding,
                    TextConverter,
                ))
                .param::<tether::Part, _>(RawPart)
                .param::<BTreeMap<String, String>, _>(PartMap::new(
                    TextConverter,
                    &config.transfer_encoding,
                )))
        })
        .expect("method");

    let title = "hello".to_string();
    let raw = tether::Part::text("note", "raw");
    let extra = BTreeMap::from([("tag".to_string(), "x".to_string())]);
    let request = service
        .request("upload", &[Some(&title), Some(&raw), Some(&extra)])
        .expect("request");

    let_assert!(Some(content_type) = request.header("Content-Type"));
    check!(content_type.starts_with("multipart/form-data; boundary="));

    let body = body_text(&request);
    let encoding = "\r\nContent-Transfer-Encoding: 8bit";
    check!(body.contains(&format!("form-data; name=\"title\"{encoding}")));
    check!(body.contains("Content-Disposition: form-data; name=\"note\""));
    check!(body.contains(&format!("form-data; name=\"tag\"{encoding}")));

    let title_at = body.find("name=\"title\"").expect("title");
    let note_at = body.find("name=\"note\"").expect("note");
    let tag_at = body.find("name=\"tag\"").expect("tag");
    check!(title_at < note_at);
    check!(note_at < tag_at);
}

#[test]
fn class_handlers_run_before_method_handlers() {
    let metadata =
        ServiceMetadata::new("Example").with(ClassAnnotation::queries(["userid={userid}"]));
    let service = service(metadata);
    service
        .method("get", |_| {
            Ok(MethodDefinition::new(Method::Get, "/foo")
                .param::<String, _>(Query::new("userid", ToStringConverter, false)))
        })
        .expect("method");

    let explicit = "99".to_string();
    let request = service.request("get", &[Some(&explicit)]).expect("request");
    check!(request.url().query() == Some("userid=7&userid=99"));
}

#[test]
fn dynamic_relative_url() {
    let service = plain();
    service
        .method("follow", |_| {
            Ok(MethodDefinition::without_url(Method::Get).param::<String, _>(RelativeUrl))
        })
        .expect("method");

    let next = "/page/2?sort=asc".to_string();
    let request = service.request("follow", &[Some(&next)]).expect("request");
    check!(request.url().as_str() == "http://example.com/page/2?sort=asc");

    let_assert!(Err(err) = service.request("follow", &[None]));
    check!(err.is_validation());
}

#[test]
fn dynamic_relative_url_keeps_literal_braces() {
    let service = plain();
    service
        .method("follow", |_| {
            Ok(MethodDefinition::without_url(Method::Get).param::<String, _>(RelativeUrl))
        })
        .expect("method");

    let next = "/search?filter={active}".to_string();
    let request = service.request("follow", &[Some(&next)]).expect("request");
    check!(request.url().path() == "/search");
    check!(request.url().query() == Some("filter={active}"));
}

#[test]
fn method_is_compiled_once() {
    let service = plain();
    let first = service
        .method("get", |_| Ok(MethodDefinition::new(Method::Get, "/first")))
        .expect("method");
    let second = service
        .method("get", |_| Ok(MethodDefinition::new(Method::Get, "/second")))
        .expect("cached");

    check!(std::sync::Arc::ptr_eq(&first, &second));
    check!(second.relative_url() == Some("/first"));
}

#[test]
fn handlers_are_usable_directly() {
    let mut builder =
        tether::RequestBuilder::new(Method::Get, "http://example.com/".parse().expect("url"));
    builder.set_relative_url("/x");
    Query::new("q", ToStringConverter, false)
        .apply(&mut builder, Some("v"))
        .expect("apply");
    let request = builder.build().expect("build");
    check!(request.url().as_str() == "http://example.com/x?q=v");
}
