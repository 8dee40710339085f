use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::{Array, Function};
use serde_json::json;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    window, Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
};
use yew::prelude::*;

use crate::config::ClientConfig;
use crate::content::{Content, CounterItem, SkillFace};
use crate::logging::{log_event, LogLevel};
use crate::reveal::{
    label_delay_ms, letter_opacity, school_delay_ms, LetterReveal, FADE_CSS, TICK_MS,
    VISIBILITY_THRESHOLD,
};
use crate::stage::mount_into;
use crate::visuals::{AnimatedCube, InteractiveCubes, SpinningCube, DEFAULT_CUBE_WORDS};

struct VisibilityWatcher {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

impl VisibilityWatcher {
    fn observe(target: &Element, mut on_change: impl FnMut(bool) + 'static) -> Option<Self> {
        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, _observer: IntersectionObserver| {
                let intersecting = entries
                    .iter()
                    .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                    .any(|entry| entry.is_intersecting());
                on_change(intersecting);
            },
        );

        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(VISIBILITY_THRESHOLD));
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
                .ok()?;
        observer.observe(target);

        Some(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for VisibilityWatcher {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

fn clear_interval(interval: &Cell<Option<i32>>) {
    if let (Some(handle), Some(win)) = (interval.take(), window()) {
        win.clear_interval_with_handle(handle);
    }
}

/// The delay timer and the tick interval behind one reveal. Dropping it
/// clears whichever is still pending.
struct RevealTimers {
    delay: Option<i32>,
    interval: Rc<Cell<Option<i32>>>,
    _on_delay: Closure<dyn FnMut()>,
    _on_tick: Closure<dyn FnMut()>,
}

impl RevealTimers {
    fn start(
        reveal: Rc<RefCell<LetterReveal>>,
        delay_ms: u32,
        on_count: Callback<usize>,
    ) -> Option<Self> {
        let win = window()?;
        let interval: Rc<Cell<Option<i32>>> = Rc::default();

        let on_tick = {
            let reveal = reveal.clone();
            let interval = interval.clone();
            let on_count = on_count.clone();
            Closure::<dyn FnMut()>::new(move || {
                let step = reveal.borrow_mut().step();
                if step.is_done() {
                    clear_interval(&interval);
                }
                on_count.emit(step.count());
            })
        };
        let tick: Function = on_tick.as_ref().unchecked_ref::<Function>().clone();

        let on_delay = {
            let interval = interval.clone();
            Closure::<dyn FnMut()>::new(move || {
                let state = reveal.borrow().state();
                if state.is_done() {
                    on_count.emit(state.count());
                    return;
                }
                let Some(win) = window() else {
                    return;
                };
                interval.set(
                    win.set_interval_with_callback_and_timeout_and_arguments_0(&tick, TICK_MS as i32)
                        .ok(),
                );
            })
        };

        let delay = win
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                on_delay.as_ref().unchecked_ref(),
                delay_ms as i32,
            )
            .ok();

        Some(Self {
            delay,
            interval,
            _on_delay: on_delay,
            _on_tick: on_tick,
        })
    }
}

impl Drop for RevealTimers {
    fn drop(&mut self) {
        if let (Some(handle), Some(win)) = (self.delay.take(), window()) {
            win.clear_timeout_with_handle(handle);
        }
        clear_interval(&self.interval);
    }
}

#[derive(Properties, PartialEq)]
struct AnimatedTextProps {
    text: AttrValue,
    #[prop_or_default]
    delay_ms: u32,
    #[prop_or_default]
    class: Classes,
}

#[function_component(AnimatedText)]
fn animated_text(props: &AnimatedTextProps) -> Html {
    let config = use_context::<ClientConfig>().unwrap_or_default();
    let node = use_node_ref();
    let reveal = use_mut_ref(|| LetterReveal::new(&props.text));
    let visible = use_state(|| false);
    let count = use_state(|| 0usize);

    {
        let node = node.clone();
        let reveal = reveal.clone();
        let visible = visible.clone();
        use_effect_with((), move |_| {
            let watcher = node.cast::<Element>().and_then(|target| {
                VisibilityWatcher::observe(&target, move |intersecting| {
                    if reveal.borrow_mut().observe(intersecting) {
                        visible.set(true);
                    }
                })
            });
            move || drop(watcher)
        });
    }

    {
        let reveal = reveal.clone();
        let count = count.clone();
        use_effect_with(
            (*visible, props.text.clone(), props.delay_ms),
            move |(visible, text, delay_ms)| {
                let timers = if *visible {
                    let mut fresh = LetterReveal::new(text);
                    fresh.observe(true);
                    *reveal.borrow_mut() = fresh;

                    if config.reduced_motion {
                        count.set(reveal.borrow_mut().reveal_all());
                        None
                    } else {
                        count.set(0);
                        RevealTimers::start(
                            reveal,
                            *delay_ms,
                            Callback::from(move |shown| count.set(shown)),
                        )
                    }
                } else {
                    None
                };
                move || drop(timers)
            },
        );
    }

    let letters = props.text.chars().enumerate().map(|(index, letter)| {
        let style = format!(
            "opacity: {}; transition: {FADE_CSS};",
            letter_opacity(index, *count)
        );
        let letter = if letter == ' ' { '\u{a0}' } else { letter };
        html! { <span aria-hidden="true" style={style}>{letter.to_string()}</span> }
    });

    html! {
        <span
            ref={node}
            class={classes!("animated-text", props.class.clone())}
            aria-label={props.text.clone()}
        >
            { for letters }
        </span>
    }
}

#[derive(Properties, PartialEq)]
struct AnimatedCounterProps {
    items: Rc<Vec<CounterItem>>,
}

#[function_component(AnimatedCounter)]
fn animated_counter(props: &AnimatedCounterProps) -> Html {
    html! {
        <ul class="counter-grid">
            { for props.items.iter().enumerate().map(|(index, item)| html! {
                <li class="counter-card">
                    <AnimatedText
                        class="counter-label"
                        text={item.label.clone()}
                        delay_ms={label_delay_ms(index)}
                    />
                    <AnimatedText
                        class="counter-school muted"
                        text={item.school.clone()}
                        delay_ms={school_delay_ms(index, &item.label)}
                    />
                </li>
            }) }
        </ul>
    }
}

#[derive(Properties, PartialEq)]
struct SpinningCubeProps {
    faces: Rc<Vec<SkillFace>>,
}

#[function_component(SpinningCubeView)]
fn spinning_cube_view(props: &SpinningCubeProps) -> Html {
    let config = use_context::<ClientConfig>().unwrap_or_default();
    let container = use_node_ref();

    {
        let container = container.clone();
        use_effect_with((config, props.faces.clone()), move |(config, faces)| {
            let faces = faces.clone();
            let stage = mount_into(&container, *config, move |aspect| {
                SpinningCube::new(&faces, aspect)
            });
            move || drop(stage)
        });
    }

    html! { <div ref={container} class="cube-stage spinning-cube" aria-hidden="true" /> }
}

#[derive(Properties, PartialEq)]
struct AnimatedCubeProps {
    words: Rc<Vec<String>>,
}

#[function_component(AnimatedCubeView)]
fn animated_cube_view(props: &AnimatedCubeProps) -> Html {
    let config = use_context::<ClientConfig>().unwrap_or_default();
    let container = use_node_ref();

    {
        let container = container.clone();
        use_effect_with((config, props.words.clone()), move |(config, words)| {
            let words = words.clone();
            let stage = mount_into(&container, *config, move |aspect| {
                AnimatedCube::new(&words, aspect)
            });
            move || drop(stage)
        });
    }

    html! { <div ref={container} class="cube-stage animated-cube" aria-hidden="true" /> }
}

#[function_component(InteractiveCubesView)]
fn interactive_cubes_view() -> Html {
    let config = use_context::<ClientConfig>().unwrap_or_default();
    let container = use_node_ref();

    {
        let container = container.clone();
        use_effect_with(config, move |config| {
            let stage = mount_into(&container, *config, |aspect| {
                InteractiveCubes::new(aspect, js_sys::Math::random)
            });
            move || drop(stage)
        });
    }

    html! { <div ref={container} class="cube-stage cube-field" aria-hidden="true" /> }
}

fn load_content(config: ClientConfig) -> Content {
    Content::embedded().unwrap_or_else(|error| {
        log_event(
            &config,
            LogLevel::Info,
            "content_parse_failed",
            json!({ "error": error.to_string() }),
        );
        Content::default()
    })
}

fn cube_words(content: &Content) -> Vec<String> {
    if content.cube_words.is_empty() {
        DEFAULT_CUBE_WORDS.iter().map(|word| word.to_string()).collect()
    } else {
        content.cube_words.clone()
    }
}

#[function_component(App)]
fn app() -> Html {
    let config = *use_state(ClientConfig::load);
    let content = use_state(move || load_content(config));
    let words = use_memo(content.cube_words.clone(), |_| cube_words(&content));
    let faces = use_memo(content.skill_faces.clone(), |faces| faces.clone());
    let items = use_memo(content.counter_items.clone(), |items| items.clone());

    use_effect_with((), move |_| {
        log_event(
            &config,
            LogLevel::Debug,
            "app_mounted",
            json!({ "reduced_motion": config.reduced_motion }),
        );
        || ()
    });

    html! {
        <ContextProvider<ClientConfig> context={config}>
            <InteractiveCubesView />
            <div class="page-shell">
                <header class="site-header" aria-labelledby="identity-heading">
                    <h1 id="identity-heading"><AnimatedText text="Kyler Cao" /></h1>
                    <SpinningCubeView faces={faces} />
                </header>

                <main id="content">
                    <section aria-labelledby="skills-heading" class="section-block">
                        <h2 id="skills-heading"><AnimatedText text="Skills" /></h2>
                        <AnimatedCubeView words={words} />
                    </section>

                    <section aria-labelledby="studies-heading" class="section-block">
                        <h2 id="studies-heading"><AnimatedText text="Studies" /></h2>
                        <AnimatedCounter items={items} />
                    </section>
                </main>
            </div>
        </ContextProvider<ClientConfig>>
    }
}

pub fn run() {
    let root = window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id("app"));

    match root {
        Some(root) => yew::Renderer::<App>::with_root(root).render(),
        None => yew::Renderer::<App>::new().render(),
    };
}
