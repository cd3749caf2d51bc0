//! XML animation definitions.
//!
//! Reader built on `roxmltree`; the writer emits the same format so written
//! definitions load back into equivalent animations.
//!
//! ```xml
//! <Animations>
//!   <AnimationDefinition name="Fade" duration="1" replayMode="once">
//!     <Affector property="Alpha" interpolator="float">
//!       <KeyFrame position="0" value="0"/>
//!       <KeyFrame position="1" value="1" progression="quadratic decelerating"/>
//!     </Affector>
//!     <Subscription event="Shown" action="Start"/>
//!   </AnimationDefinition>
//! </Animations>
//! ```

use ceanim_api_core::PropertyValue;
use log::{error, info, warn};
use roxmltree::{Document, Node};

use crate::affector::{Affector, ApplicationMethod};
use crate::animation::{Animation, ReplayMode};
use crate::error::AnimationError;
use crate::keyframe::Progression;
use crate::manager::AnimationManager;

const ANIMATIONS: &str = "Animations";
const DEFINITION: &str = "AnimationDefinition";
const AFFECTOR: &str = "Affector";
const KEY_FRAME: &str = "KeyFrame";
const SUBSCRIPTION: &str = "Subscription";

/// Load all definitions in `source` into `manager`. Atomic: on failure every
/// definition created by this call is destroyed again.
pub fn load_animations(
    manager: &mut AnimationManager,
    source: &str,
) -> Result<Vec<String>, AnimationError> {
    let doc = Document::parse(source).map_err(|err| {
        let err = AnimationError::from(err);
        error!("animation XML rejected: {err}");
        err
    })?;
    let root = doc.root_element();

    let mut created = Vec::new();
    let result = match root.tag_name().name() {
        ANIMATIONS => load_definitions(manager, root, &mut created),
        DEFINITION => load_definition(manager, root, &mut created),
        other => Err(AnimationError::Xml {
            reason: format!("unexpected root element <{other}>"),
        }),
    };

    match result {
        Ok(()) => {
            info!("loaded {} animation definition(s)", created.len());
            Ok(created)
        }
        Err(err) => {
            for name in &created {
                if let Err(cleanup) = manager.destroy_animation(name) {
                    warn!("cleanup of '{name}' after failed load: {cleanup}");
                }
            }
            error!("animation XML load failed: {err}");
            Err(err)
        }
    }
}

fn load_definitions(
    manager: &mut AnimationManager,
    root: Node<'_, '_>,
    created: &mut Vec<String>,
) -> Result<(), AnimationError> {
    for child in root.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            DEFINITION => load_definition(manager, child, created)?,
            other => warn!("ignoring unknown element <{other}> in <{ANIMATIONS}>"),
        }
    }
    Ok(())
}

fn load_definition(
    manager: &mut AnimationManager,
    node: Node<'_, '_>,
    created: &mut Vec<String>,
) -> Result<(), AnimationError> {
    let requested = node.attribute("name").unwrap_or("");
    let context = format!("{DEFINITION} '{requested}'");
    let animation = manager
        .create_animation(requested)
        .map_err(|err| err.in_context(&context))?;
    created.push(animation.name().to_string());
    fill_definition(animation, node).map_err(|err| err.in_context(context))
}

fn fill_definition(animation: &mut Animation, node: Node<'_, '_>) -> Result<(), AnimationError> {
    animation.set_duration(attr_f32(node, "duration", 0.0)?)?;
    if let Some(mode) = node.attribute("replayMode") {
        animation.set_replay_mode(mode.parse::<ReplayMode>()?);
    }
    if let Some(auto_start) = node.attribute("autoStart") {
        animation.set_auto_start(bool::from_property_str(auto_start)?);
    }

    let mut affector_idx = 0;
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            AFFECTOR => {
                load_affector(animation, child).map_err(|err| {
                    err.in_context(format!(
                        "{AFFECTOR} #{affector_idx} ('{}')",
                        child.attribute("property").unwrap_or("")
                    ))
                })?;
                affector_idx += 1;
            }
            SUBSCRIPTION => {
                let event = child.attribute("event").unwrap_or("");
                let action = child.attribute("action").unwrap_or("");
                animation
                    .define_auto_subscription(event, action)
                    .map_err(|err| err.in_context(format!("{SUBSCRIPTION} '{event}'")))?;
            }
            other => warn!(
                "ignoring unknown element <{other}> in {DEFINITION} '{}'",
                animation.name()
            ),
        }
    }
    Ok(())
}

fn load_affector(animation: &mut Animation, node: Node<'_, '_>) -> Result<(), AnimationError> {
    let property = node.attribute("property").unwrap_or("");
    let affector = match node.attribute("interpolator") {
        Some(interpolator) => animation.create_affector(property, interpolator)?,
        None => {
            warn!(
                "affector '{property}' in {DEFINITION} '{}' has no interpolator",
                animation.name()
            );
            animation.create_affector_without_interpolator(property)
        }
    };
    if let Some(method) = node.attribute("applicationMethod") {
        affector.set_application_method(method.parse::<ApplicationMethod>()?);
    }

    for (idx, child) in node.children().filter(|n| n.is_element()).enumerate() {
        match child.tag_name().name() {
            KEY_FRAME => load_key_frame(affector, child)
                .map_err(|err| err.in_context(format!("{KEY_FRAME} #{idx}")))?,
            other => warn!("ignoring unknown element <{other}> in <{AFFECTOR}>"),
        }
    }
    Ok(())
}

fn load_key_frame(affector: &mut Affector, node: Node<'_, '_>) -> Result<(), AnimationError> {
    let position = attr_f32(node, "position", 0.0)?;
    let progression = match node.attribute("progression") {
        Some(p) => p.parse::<Progression>()?,
        None => Progression::Linear,
    };
    affector.create_key_frame(
        position,
        node.attribute("value").unwrap_or(""),
        progression,
        node.attribute("sourceProperty"),
    )?;
    Ok(())
}

fn attr_f32(node: Node<'_, '_>, name: &str, default: f32) -> Result<f32, AnimationError> {
    match node.attribute(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<f32>().map_err(|_| {
            AnimationError::invalid(format!("attribute {name}=\"{raw}\" is not a number"))
        }),
    }
}

/// Minimal indenting element writer.
struct XmlWriter {
    out: String,
    depth: usize,
}

impl XmlWriter {
    fn new() -> Self {
        Self {
            out: String::new(),
            depth: 0,
        }
    }

    fn start_tag(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        for _ in 0..self.depth {
            self.out.push_str("    ");
        }
        self.out.push('<');
        self.out.push_str(tag);
        for (name, value) in attrs {
            self.out.push(' ');
            self.out.push_str(name);
            self.out.push_str("=\"");
            escape_into(&mut self.out, value);
            self.out.push('"');
        }
    }

    fn open(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        self.start_tag(tag, attrs);
        self.out.push_str(">\n");
        self.depth += 1;
    }

    fn empty(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        self.start_tag(tag, attrs);
        self.out.push_str(" />\n");
    }

    fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        for _ in 0..self.depth {
            self.out.push_str("    ");
        }
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push_str(">\n");
    }
}

fn escape_into(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
}

fn write_definition(w: &mut XmlWriter, animation: &Animation) {
    let duration = animation.duration().to_string();
    let auto_start = animation.auto_start().to_string();
    w.open(
        DEFINITION,
        &[
            ("name", animation.name()),
            ("duration", duration.as_str()),
            ("replayMode", animation.replay_mode().as_str()),
            ("autoStart", auto_start.as_str()),
        ],
    );

    for affector in animation.affectors() {
        let mut attrs = vec![("property", affector.target_property())];
        if let Some(interpolator) = affector.interpolator() {
            attrs.push(("interpolator", interpolator.type_name()));
        }
        attrs.push(("applicationMethod", affector.application_method().as_str()));
        w.open(AFFECTOR, &attrs);

        for kf in affector.key_frames() {
            let position = kf.position().to_string();
            let mut attrs = vec![("position", position.as_str()), ("value", kf.value())];
            if let Some(source) = kf.source_property() {
                attrs.push(("sourceProperty", source));
            }
            attrs.push(("progression", kf.progression().as_str()));
            w.empty(KEY_FRAME, &attrs);
        }
        w.close(AFFECTOR);
    }

    for (event, action) in animation.auto_subscriptions() {
        w.empty(
            SUBSCRIPTION,
            &[("event", event.as_str()), ("action", action.as_str())],
        );
    }
    w.close(DEFINITION);
}

/// Serialise one definition as a standalone `<AnimationDefinition>` element.
pub fn write_animation_xml(animation: &Animation) -> String {
    let mut w = XmlWriter::new();
    write_definition(&mut w, animation);
    w.out
}

/// Serialise several definitions inside an `<Animations>` root.
pub fn write_animations_xml<'a>(animations: impl IntoIterator<Item = &'a Animation>) -> String {
    let mut w = XmlWriter::new();
    w.open(ANIMATIONS, &[]);
    for animation in animations {
        write_definition(&mut w, animation);
    }
    w.close(ANIMATIONS);
    w.out
}
