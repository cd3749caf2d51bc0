use std::rc::Rc;

use ceanim_animation_core::{
    AnimationManager, Interpolator, InterpolatorRegistry, PropertyMap, SharedPropertySet,
};
use ceanim_api_core::FormatError;

/// One representative value per built-in linear type.
const LINEAR_SAMPLES: &[(&str, &str)] = &[
    ("float", "0.125"),
    ("int", "-7"),
    ("uint", "42"),
    ("Size", "w:12.5 h:3"),
    ("Vector2", "x:1 y:-2"),
    ("Vector3", "x:1 y:2 z:3"),
    ("Rect", "l:0 t:5 r:100 b:50.5"),
    ("Colour", "80FF7F00"),
    (
        "ColourRect",
        "tl:FF000000 tr:FFFF0000 bl:FF00FF00 br:FF0000FF",
    ),
    ("UDim", "{0.5,10}"),
    ("UVector2", "{{0.5,10},{0.25,-4}}"),
    ("USize", "{{1,0},{0,32}}"),
    ("URect", "{{0,1},{0,2},{1,-3},{1,-4}}"),
    ("UBox", "{top:{0,1},left:{0,2},bottom:{0,3},right:{0,4}}"),
];

#[test]
fn linear_interpolation_between_equal_values_is_identity() {
    let reg = InterpolatorRegistry::with_builtins();
    for (type_name, value) in LINEAR_SAMPLES {
        let interp = reg.get(type_name).unwrap();
        for t in [0.0, 0.1, 0.5, 0.77, 1.0] {
            assert_eq!(
                interp.interpolate_absolute(value, value, t).unwrap(),
                *value,
                "{type_name} at {t}"
            );
        }
    }
}

#[test]
fn discrete_switches_exactly_at_half() {
    let reg = InterpolatorRegistry::with_builtins();
    for (type_name, v1, v2) in [("bool", "false", "true"), ("String", "left", "right")] {
        let interp = reg.get(type_name).unwrap();
        assert_eq!(interp.interpolate_absolute(v1, v2, 0.49999).unwrap(), v1);
        assert_eq!(interp.interpolate_absolute(v1, v2, 0.5).unwrap(), v2);
        assert_eq!(interp.interpolate_absolute(v1, v2, 0.9).unwrap(), v2);
    }
}

#[test]
fn geometry_midpoints() {
    let reg = InterpolatorRegistry::with_builtins();
    let cases = [
        ("Vector2", "x:0 y:0", "x:10 y:-4", "x:5 y:-2"),
        ("UDim", "{0,0}", "{1,20}", "{0.5,10}"),
        ("Colour", "00000000", "FFFFFFFF", "80808080"),
        ("int", "0", "5", "2"),
    ];
    for (type_name, v1, v2, mid) in cases {
        let interp = reg.get(type_name).unwrap();
        assert_eq!(interp.interpolate_absolute(v1, v2, 0.5).unwrap(), mid, "{type_name}");
    }
}

#[test]
fn conversion_failures_surface_as_format_errors() {
    let reg = InterpolatorRegistry::with_builtins();
    let err = reg
        .get("Vector2")
        .unwrap()
        .interpolate_absolute("x:1", "x:1 y:1", 0.5)
        .unwrap_err();
    assert_eq!(err.type_name, "Vector2");
    assert!(reg
        .get("uint")
        .unwrap()
        .interpolate_relative("-1", "0", "1", 0.5)
        .is_err());
}

/// Caller-owned interpolator that snaps to whichever value is closer, in upper case.
#[derive(Debug)]
struct Shout;

impl Interpolator for Shout {
    fn type_name(&self) -> &str {
        "Shout"
    }

    fn interpolate_absolute(&self, v1: &str, v2: &str, pos: f32) -> Result<String, FormatError> {
        Ok(if pos < 0.5 { v1 } else { v2 }.to_uppercase())
    }

    fn interpolate_relative(
        &self,
        base: &str,
        v1: &str,
        v2: &str,
        pos: f32,
    ) -> Result<String, FormatError> {
        Ok(format!("{base}{}", self.interpolate_absolute(v1, v2, pos)?))
    }

    fn interpolate_relative_multiply(
        &self,
        base: &str,
        _v1: &str,
        _v2: &str,
        _pos: f32,
    ) -> Result<String, FormatError> {
        Ok(base.to_string())
    }
}

#[test]
fn user_interpolators_outlive_the_manager() {
    let shout: Rc<dyn Interpolator> = Rc::new(Shout);
    let target = PropertyMap::new().into_shared();
    {
        let mut mgr = AnimationManager::default();
        mgr.add_interpolator(shout.clone()).unwrap();
        let anim = mgr.create_animation("Title").unwrap();
        anim.set_duration(1.0).unwrap();
        let aff = anim.create_affector("Caption", "Shout").unwrap();
        aff.create_key_frame(0.0, "hello", Default::default(), None)
            .unwrap();
        aff.create_key_frame(1.0, "bye", Default::default(), None)
            .unwrap();

        let id = mgr.instantiate_animation("Title").unwrap();
        let shared: SharedPropertySet = target.clone();
        let mut pb = mgr.playback(id).unwrap();
        pb.set_target(Some(shared));
        pb.set_position(0.75).unwrap();
        pb.apply();
    }
    assert_eq!(target.borrow().get("Caption"), Some("BYE"));
    // manager and its definitions are gone, the caller's handle is the last one
    assert_eq!(Rc::strong_count(&shout), 1);
}
