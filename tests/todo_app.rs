//! The classic to-do application, driven end to end through the in-memory host.

use brook::{
    App, AppConfig, AppError,
    editable::{EDITING_KEY, Editable, editing_target},
    memory::{MemoryHost, MemoryNode},
    prelude::*,
    router::MemoryHistory,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Todo {
    id: u64,
    text: String,
    completed: bool,
}

fn todos(store: &Store) -> Vec<Todo> {
    store.state().decode("todos").unwrap_or_default()
}

fn save(store: &Store, todos: Vec<Todo>) {
    store.set_state([("todos", Value::from(todos))]);
}

fn add_todo(store: &Store, event: &Event) {
    if event.key() != Some("Enter") {
        return;
    }
    let text = event.value().unwrap_or_default().trim();
    if text.is_empty() {
        return;
    }
    let mut list = todos(store);
    let id = list.iter().map(|todo| todo.id).max().map_or(1, |id| id + 1);
    list.push(Todo {
        id,
        text: text.to_owned(),
        completed: false,
    });
    save(store, list);
}

fn update_text(store: &Store, id: u64, text: &str) {
    let text = text.trim();
    let mut list = todos(store);
    if text.is_empty() {
        list.retain(|todo| todo.id != id);
    } else if let Some(todo) = list.iter_mut().find(|todo| todo.id == id) {
        todo.text = text.to_owned();
    }
    save(store, list);
}

fn item(store: &Store, todo: &Todo, editing: Option<&str>) -> Node {
    let editable_id = format!("todo-{}", todo.id);
    let class = if editing == Some(editable_id.as_str()) {
        "editing"
    } else if todo.completed {
        "completed"
    } else {
        ""
    };
    let id = todo.id;

    let toggle = {
        let store = store.clone();
        move |_: &Event| {
            let mut list = todos(&store);
            for todo in list.iter_mut().filter(|todo| todo.id == id) {
                todo.completed = !todo.completed;
            }
            save(&store, list);
        }
    };
    let destroy = {
        let store = store.clone();
        move |_: &Event| {
            let mut list = todos(&store);
            list.retain(|todo| todo.id != id);
            save(&store, list);
        }
    };
    let label = {
        let update_store = store.clone();
        Editable::new(editable_id, todo.text.clone())
            .attr("class", "label")
            .on_update(move |text| update_text(&update_store, id, text))
            .build(&store)
    };

    h(
        "li",
        [("class", class)],
        h(
            "div",
            [("class", "view")],
            (
                Node::new("input")
                    .attr("class", "toggle")
                    .attr("type", "checkbox")
                    .attr("checked", todo.completed)
                    .on("click", toggle),
                label,
                Node::new("button")
                    .attr("class", "destroy")
                    .on("click", destroy),
            ),
        ),
    )
}

fn filter_link(router: &Router, label: &str, filter: &str, selected: &str) -> Node {
    let address = if filter == "all" {
        "#/".to_owned()
    } else {
        format!("#/{filter}")
    };
    let router = router.clone();
    let href = address.clone();
    h(
        "li",
        (),
        Node::new("a")
            .attr("class", if filter == selected { "selected" } else { "" })
            .attr("href", href)
            .on("click", move |event| {
                event.prevent_default();
                if let Err(err) = router.navigate(&address) {
                    tracing::warn!(error = %err, "navigation failed");
                }
            })
            .child(label),
    )
}

fn footer(store: &Store, router: &Router, list: &[Todo], filter: &str) -> Node {
    let active = list.iter().filter(|todo| !todo.completed).count();
    let completed = list.len() - active;
    let clear = {
        let store = store.clone();
        move |_: &Event| {
            let mut list = todos(&store);
            list.retain(|todo| !todo.completed);
            save(&store, list);
        }
    };

    h(
        "footer",
        [("class", "footer")],
        (
            h(
                "span",
                [("class", "todo-count")],
                (
                    h("strong", (), active.to_string()),
                    format!(" item{} left", if active == 1 { "" } else { "s" }),
                ),
            ),
            h(
                "ul",
                [("class", "filters")],
                [
                    filter_link(router, "All", "all", filter),
                    filter_link(router, "Active", "active", filter),
                    filter_link(router, "Completed", "completed", filter),
                ],
            ),
            (completed > 0).then(|| {
                Node::new("button")
                    .attr("class", "clear-completed")
                    .on("click", clear)
                    .child("Clear completed")
            }),
        ),
    )
}

fn view(store: &Store, router: &Router, state: &State) -> Node {
    let list: Vec<Todo> = state.decode("todos").unwrap_or_default();
    let filter = state.decode::<String>("filter").unwrap_or_else(|| "all".to_owned());
    let editing = editing_target(state);

    let new_todo = {
        let store = store.clone();
        Node::new("input")
            .attr("class", "new-todo")
            .attr("placeholder", "What needs to be done?")
            .attr("autofocus", true)
            .on("keydown", move |event| add_todo(&store, event))
    };
    let toggle_all = {
        let store = store.clone();
        move |_: &Event| {
            let mut list = todos(&store);
            let completed = !list.iter().all(|todo| todo.completed);
            for todo in &mut list {
                todo.completed = completed;
            }
            save(&store, list);
        }
    };

    let visible: Vec<Node> = list
        .iter()
        .filter(|todo| match filter.as_str() {
            "active" => !todo.completed,
            "completed" => todo.completed,
            _ => true,
        })
        .map(|todo| item(store, todo, editing.as_deref()))
        .collect();

    let main = (!list.is_empty()).then(|| {
        h(
            "section",
            [("class", "main")],
            (
                Node::new("input")
                    .attr("id", "toggle-all")
                    .attr("class", "toggle-all")
                    .attr("type", "checkbox")
                    .attr("checked", list.iter().all(|todo| todo.completed))
                    .on("click", toggle_all),
                h("label", [("for", "toggle-all")], "Mark all as complete"),
                h("ul", [("class", "todo-list")], visible),
            ),
        )
    });

    h(
        "section",
        [("class", "todoapp")],
        (
            h("header", [("class", "header")], (h("h1", (), "todos"), new_todo)),
            main,
            (!list.is_empty()).then(|| footer(store, router, &list, &filter)),
        ),
    )
}

struct TodoApp {
    app: App<MemoryHost>,
    history: MemoryHistory,
}

impl TodoApp {
    fn start(config: AppConfig, address: &str) -> Result<Self, AppError> {
        let host = MemoryHost::new();
        let root = host.create_element("div")?;
        host.set_attribute(&root, "id", "app")?;
        host.append_child(&host.body(), &root)?;

        let history = MemoryHistory::new(address);
        let app = App::builder(host).config(config).build(history.clone())?;
        app.use_plugin(|app| {
            let routes = [("/", "all"), ("/#/active", "active"), ("/#/completed", "completed")];
            for (pattern, filter) in routes {
                let store = app.store().clone();
                app.router().route(pattern, move |_| {
                    store.set_state([("filter", Value::from(filter))]);
                    Ok(RouteResult::Handled)
                });
            }
        });

        let store = app.store().clone();
        let router = app.router().clone();
        app.mount(move |state| view(&store, &router, state))?;
        app.start()?;
        Ok(Self { app, history })
    }

    fn new() -> Self {
        let config = AppConfig::from_json(
            r#"{ "initial_state": { "todos": [], "filter": "all", "editing": null } }"#,
        )
        .unwrap();
        Self::start(config, "/").unwrap()
    }

    fn root(&self) -> &MemoryNode {
        self.app.root()
    }

    fn one(&self, class: &str) -> MemoryNode {
        self.root()
            .by_class(class)
            .into_iter()
            .next()
            .unwrap_or_else(|| panic!("no element with class `{class}`"))
    }

    fn dispatch(&self, target: &MemoryNode, event: Event) -> Event {
        self.app.host().dispatch(target, event)
    }

    fn type_todo(&self, text: &str) {
        let input = self.one("new-todo");
        input.set_value(text).unwrap();
        self.dispatch(&input, Event::key_down("Enter"));
    }

    fn items(&self) -> Vec<MemoryNode> {
        self.root()
            .by_class("todo-list")
            .iter()
            .flat_map(MemoryNode::children)
            .collect()
    }

    fn item_texts(&self) -> Vec<String> {
        self.items().iter().map(MemoryNode::text_content).collect()
    }

    fn count(&self) -> String {
        self.one("todo-count").text_content()
    }

    fn link(&self, text: &str) -> MemoryNode {
        self.root()
            .find(|node| node.tag().as_deref() == Some("a") && node.text_content() == text)
            .unwrap()
    }
}

#[test]
fn starts_empty() {
    let todo = TodoApp::new();
    assert_eq!(todo.root().by_tag("h1")[0].text_content(), "todos");
    assert!(todo.root().by_class("main").is_empty());
    assert!(todo.root().by_class("footer").is_empty());
    assert!(todo.one("new-todo").has_attribute("autofocus"));
}

#[test]
fn adding_todos() {
    let todo = TodoApp::new();
    todo.type_todo("Buy milk");
    todo.type_todo("  Walk the dog ");
    todo.type_todo("   ");

    assert_eq!(todo.item_texts(), ["Buy milk", "Walk the dog"]);
    assert_eq!(todo.count(), "2 items left");
    assert!(todo.root().by_class("clear-completed").is_empty());
}

#[test]
fn other_keys_do_not_add() {
    let todo = TodoApp::new();
    let input = todo.one("new-todo");
    input.set_value("Buy milk").unwrap();
    todo.dispatch(&input, Event::key_down("a"));

    assert!(todo.items().is_empty());
}

#[test]
fn toggling_marks_completed() {
    let todo = TodoApp::new();
    todo.type_todo("Buy milk");
    todo.type_todo("Walk the dog");

    let toggle = todo.items()[0].by_class("toggle")[0].clone();
    todo.dispatch(&toggle, Event::new("click"));

    let first = &todo.items()[0];
    assert_eq!(first.attribute("class").as_deref(), Some("completed"));
    assert!(first.by_class("toggle")[0].has_attribute("checked"));
    assert!(!todo.items()[1].by_class("toggle")[0].has_attribute("checked"));
    assert_eq!(todo.count(), "1 item left");
    assert_eq!(todo.one("clear-completed").text_content(), "Clear completed");
}

#[test]
fn filters_follow_the_hash() {
    let todo = TodoApp::new();
    todo.type_todo("Buy milk");
    todo.type_todo("Walk the dog");
    let toggle = todo.items()[0].by_class("toggle")[0].clone();
    todo.dispatch(&toggle, Event::new("click"));

    let event = todo.dispatch(&todo.link("Active"), Event::new("click"));
    assert!(event.default_prevented());
    assert_eq!(todo.history.location().hash, "#/active");
    assert_eq!(todo.item_texts(), ["Walk the dog"]);
    assert_eq!(todo.link("Active").attribute("class").as_deref(), Some("selected"));

    todo.dispatch(&todo.link("Completed"), Event::new("click"));
    assert_eq!(todo.item_texts(), ["Buy milk"]);

    assert!(todo.history.back());
    assert_eq!(todo.item_texts(), ["Walk the dog"]);

    todo.dispatch(&todo.link("All"), Event::new("click"));
    assert_eq!(todo.item_texts().len(), 2);
    let route = RouteOutcome::from_state(&todo.app.store().state()).unwrap();
    assert_eq!(route.path, "/#/");
    assert!(!route.not_found);
}

#[test]
fn editing_in_place() {
    let todo = TodoApp::new();
    todo.type_todo("Buy milk");

    let label = todo.one("label");
    assert_eq!(label.tag().as_deref(), Some("span"));
    todo.dispatch(&label, Event::new("dblclick"));

    assert_eq!(todo.items()[0].attribute("class").as_deref(), Some("editing"));
    let input = todo.one("label");
    assert_eq!(input.tag().as_deref(), Some("input"));
    assert_eq!(input.attribute("value").as_deref(), Some("Buy milk"));

    input.set_value("Buy oat milk").unwrap();
    todo.dispatch(&input, Event::key_down("Enter"));

    assert_eq!(todo.item_texts(), ["Buy oat milk"]);
    assert_eq!(editing_target(&todo.app.store().state()), None);
    assert_eq!(todo.one("label").tag().as_deref(), Some("span"));
}

#[test]
fn escape_keeps_text_and_blank_edit_removes() {
    let todo = TodoApp::new();
    todo.type_todo("Buy milk");
    todo.type_todo("Walk the dog");

    todo.app.store().set_state([(EDITING_KEY, Value::from("todo-1"))]);
    let input = todo.one("label");
    input.set_value("changed").unwrap();
    todo.dispatch(&input, Event::key_down("Escape"));
    assert_eq!(todo.item_texts(), ["Buy milk", "Walk the dog"]);

    todo.app.store().set_state([(EDITING_KEY, Value::from("todo-2"))]);
    let input = todo
        .root()
        .find(|node| node.attribute("id").as_deref() == Some("todo-2"))
        .unwrap();
    input.set_value("   ").unwrap();
    todo.dispatch(&input, Event::new("blur"));
    assert_eq!(todo.item_texts(), ["Buy milk"]);
}

#[test]
fn destroy_clear_and_toggle_all() {
    let todo = TodoApp::new();
    for text in ["one", "two", "three"] {
        todo.type_todo(text);
    }

    let destroy = todo.items()[1].by_class("destroy")[0].clone();
    todo.dispatch(&destroy, Event::new("click"));
    assert_eq!(todo.item_texts(), ["one", "three"]);

    todo.dispatch(&todo.one("toggle-all"), Event::new("click"));
    assert_eq!(todo.count(), "0 items left");
    assert!(todo.one("toggle-all").has_attribute("checked"));

    todo.dispatch(&todo.one("clear-completed"), Event::new("click"));
    assert!(todo.items().is_empty());
    assert!(todo.root().by_class("footer").is_empty());
}

#[test]
fn clicks_reach_the_bridge() {
    let todo = TodoApp::new();
    todo.type_todo("Buy milk");
    let toggle = todo.items()[0].by_class("toggle")[0].clone();
    todo.dispatch(&toggle, Event::new("click"));

    assert_eq!(todo.app.bridge().dispatch_count("click"), 1);
    assert_eq!(todo.app.bridge().dispatch_count("keydown"), 1);
}

#[test]
fn state_survives_a_reload() {
    let todo = TodoApp::new();
    todo.type_todo("Buy milk");
    todo.type_todo("Walk the dog");
    let toggle = todo.items()[1].by_class("toggle")[0].clone();
    todo.dispatch(&toggle, Event::new("click"));

    let saved = todo.app.store().state().to_json(&["todos", "filter"]);
    let config = AppConfig {
        initial_state: saved,
        ..AppConfig::default()
    };
    let reloaded = TodoApp::start(config, "/#/completed").unwrap();

    assert_eq!(reloaded.item_texts(), ["Walk the dog"]);
    assert_eq!(todos(reloaded.app.store()), todos(todo.app.store()));
}

#[test]
fn unknown_route_is_published() {
    let todo = TodoApp::start(AppConfig::default(), "/settings").unwrap();
    let route = RouteOutcome::from_state(&todo.app.store().state()).unwrap();
    assert!(route.not_found);
    assert_eq!(route.path, "/settings");
}

#[test]
fn missing_root_fails_to_start() {
    let result = App::builder(MemoryHost::new())
        .with_root_id("todoapp")
        .build(MemoryHistory::default());
    assert!(matches!(result, Err(AppError::RootNotFound(id)) if id == "todoapp"));
}

#[test]
fn route_view_replaces_the_app() {
    let todo = TodoApp::new();
    todo.type_todo("Buy milk");
    todo.app.router().route("/#/about", |_| {
        Ok(RouteResult::view(h("article", [("class", "about")], "A to-do list")))
    });

    todo.app.router().navigate("#/about").unwrap();

    assert_eq!(todo.root().children().len(), 1);
    assert_eq!(todo.one("about").text_content(), "A to-do list");
    assert!(todo.root().by_class("todoapp").is_empty());

    assert!(todo.history.back());
    assert_eq!(todo.item_texts(), ["Buy milk"]);
}
