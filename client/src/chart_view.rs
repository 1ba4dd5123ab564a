use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Element};
use worldmap_shared::morph::ShapeMorph;
use worldmap_shared::{Chart, Frame, InitialFrame, RenderState, RestyleFrame, TileGrid, World};

use crate::animation::{FrameLoop, MorphTransition};
use crate::config::SVG_NS;
use crate::visit::InFlightGuard;

const SHAPE_STROKE: &str = "gray";
const LABEL_STYLE: &str = "font-size: 10px; font-family: Helvetica, Arial, sans-serif;";

fn js_err(e: JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{e:?}"))
}

fn create_svg(document: &Document, tag: &str) -> Result<Element, String> {
    document
        .create_element_ns(Some(SVG_NS), tag)
        .map_err(js_err)
}

fn set_attrs(element: &Element, attrs: &[(&str, &str)]) -> Result<(), String> {
    for (name, value) in attrs {
        element.set_attribute(name, value).map_err(js_err)?;
    }
    Ok(())
}

/// Shapes and labels in flight between their geographic outline and their tile.
#[derive(Default)]
struct MorphAnimation {
    shapes: Vec<(Element, ShapeMorph)>,
    labels: Vec<Element>,
    transition: Option<MorphTransition>,
    duration: f64,
}

impl MorphAnimation {
    /// Paint the frame at `timestamp`; returns `true` while more frames are needed.
    fn render(&mut self, timestamp: f64) -> bool {
        let duration = self.duration;
        let transition = *self
            .transition
            .get_or_insert_with(|| MorphTransition::new(timestamp, duration));
        let t = transition.progress(timestamp);

        for (shape, morph) in &self.shapes {
            let _ = shape.set_attribute("d", &morph.path_at(t));
        }
        let opacity = t.to_string();
        for label in &self.labels {
            let _ = label.set_attribute("opacity", &opacity);
        }

        if transition.is_finished(timestamp) {
            self.shapes.clear();
            self.labels.clear();
            self.transition = None;
            return false;
        }
        true
    }
}

/// SVG rendering of a [`Chart`]: a shape layer under a label layer inside the mount element.
pub struct ChartView {
    chart: RefCell<Chart>,
    svg: Element,
    map_layer: Element,
    label_layer: Element,
    shapes: RefCell<Vec<Element>>,
    labels: RefCell<HashMap<usize, Element>>,
    animation: Rc<RefCell<MorphAnimation>>,
    frame_loop: FrameLoop,
    click_handlers: RefCell<Vec<Closure<dyn Fn(web_sys::MouseEvent)>>>,
    visit_guard: InFlightGuard,
}

impl ChartView {
    /// Append an empty chart surface to `mount`. Nothing is drawn until the first update.
    pub fn create(
        mount: &Element,
        world: World,
        grid: TileGrid,
        morph_duration: f64,
    ) -> Result<Rc<Self>, String> {
        let document = mount
            .owner_document()
            .ok_or_else(|| "mount element is not attached to a document".to_string())?;
        let chart = Chart::new(world, grid);
        let (width, height) = chart.size();
        let margin = chart.margin();

        let svg = create_svg(&document, "svg")?;
        set_attrs(
            &svg,
            &[
                ("width", width.to_string().as_str()),
                ("height", height.to_string().as_str()),
                ("viewBox", format!("0 0 {width} {height}").as_str()),
            ],
        )?;
        let main = create_svg(&document, "g")?;
        set_attrs(
            &main,
            &[(
                "transform",
                format!("translate({},{})", margin.left, margin.top).as_str(),
            )],
        )?;
        let map_layer = create_svg(&document, "g")?;
        set_attrs(&map_layer, &[("class", "map")])?;
        let label_layer = create_svg(&document, "g")?;
        set_attrs(&label_layer, &[("class", "labels")])?;

        main.append_child(&map_layer).map_err(js_err)?;
        main.append_child(&label_layer).map_err(js_err)?;
        svg.append_child(&main).map_err(js_err)?;
        mount.append_child(&svg).map_err(js_err)?;

        let animation = Rc::new(RefCell::new(MorphAnimation {
            duration: morph_duration,
            ..MorphAnimation::default()
        }));
        let frame_loop = FrameLoop::new({
            let animation = Rc::clone(&animation);
            move |timestamp| animation.borrow_mut().render(timestamp)
        });

        Ok(Rc::new(Self {
            chart: RefCell::new(chart),
            svg,
            map_layer,
            label_layer,
            shapes: RefCell::new(Vec::new()),
            labels: RefCell::new(HashMap::new()),
            animation,
            frame_loop,
            click_handlers: RefCell::new(Vec::new()),
            visit_guard: InFlightGuard::default(),
        }))
    }

    /// Push a new configuration and apply whatever the chart decides to redraw.
    /// Returns the root `<svg>` whether or not anything was redrawn.
    pub fn update(self: &Rc<Self>, state: RenderState) -> Result<Element, String> {
        let frame = self.chart.borrow_mut().update(state);
        match frame {
            Some(Frame::Initial(frame)) => self.draw_initial(frame)?,
            Some(Frame::Restyle(frame)) => self.restyle(&frame),
            None => {}
        }
        Ok(self.svg.clone())
    }

    pub fn feature_name(&self, feature: usize) -> Option<String> {
        self.chart
            .borrow()
            .world()
            .features
            .get(feature)
            .map(|f| f.name.clone())
    }

    pub fn visit_guard(&self) -> &InFlightGuard {
        &self.visit_guard
    }

    fn draw_initial(self: &Rc<Self>, frame: InitialFrame) -> Result<(), String> {
        let document = self
            .svg
            .owner_document()
            .ok_or_else(|| "chart is not attached to a document".to_string())?;

        for code in &frame.unmatched {
            web_sys::console::log_1(&format!("Unmatched country {code}").into());
        }

        let mut fading = Vec::with_capacity(frame.labels.len());
        {
            let mut labels = self.labels.borrow_mut();
            for label in &frame.labels {
                let text = create_svg(&document, "text")?;
                set_attrs(
                    &text,
                    &[
                        ("class", "label"),
                        ("x", label.x.to_string().as_str()),
                        ("y", label.y.to_string().as_str()),
                        ("fill", label.fill),
                        ("text-anchor", "middle"),
                        ("dominant-baseline", "central"),
                        ("style", LABEL_STYLE),
                        ("opacity", "0"),
                    ],
                )?;
                text.set_text_content(Some(&label.text));
                self.label_layer.append_child(&text).map_err(js_err)?;
                fading.push(text.clone());
                labels.insert(label.feature, text);
            }
        }

        let mut morphing = Vec::new();
        for shape in frame.shapes {
            let path = create_svg(&document, "path")?;
            set_attrs(
                &path,
                &[
                    ("class", "country"),
                    ("fill", shape.fill.as_str()),
                    ("stroke", SHAPE_STROKE),
                    ("stroke-width", "1"),
                ],
            )?;
            if let Some(d) = &shape.geo_path {
                set_attrs(&path, &[("d", d.as_str())])?;
            }
            self.map_layer.append_child(&path).map_err(js_err)?;
            self.bind_click(&path, shape.feature)?;
            if let Some(morph) = shape.morph {
                morphing.push((path.clone(), morph));
            }
            self.shapes.borrow_mut().push(path);
        }

        let snap = {
            let mut animation = self.animation.borrow_mut();
            animation.shapes = morphing;
            animation.labels = fading;
            animation.transition = None;
            if animation.duration <= 0.0 {
                animation.render(0.0);
                true
            } else {
                false
            }
        };
        if !snap {
            self.frame_loop.start();
        }
        Ok(())
    }

    fn restyle(&self, frame: &RestyleFrame) {
        for (shape, fill) in self.shapes.borrow().iter().zip(&frame.shape_fills) {
            let _ = shape.set_attribute("fill", fill);
        }
        let labels = self.labels.borrow();
        for (feature, fill) in &frame.label_fills {
            if let Some(label) = labels.get(feature) {
                let _ = label.set_attribute("fill", fill);
            }
        }
    }

    fn bind_click(self: &Rc<Self>, path: &Element, feature: usize) -> Result<(), String> {
        let view = Rc::downgrade(self);
        let handler = Closure::<dyn Fn(web_sys::MouseEvent)>::new(move |_: web_sys::MouseEvent| {
            let Some(view) = view.upgrade() else {
                return;
            };
            wasm_bindgen_futures::spawn_local(crate::visit::record_click(view, feature));
        });
        path.add_event_listener_with_callback("click", handler.as_ref().unchecked_ref())
            .map_err(js_err)?;
        self.click_handlers.borrow_mut().push(handler);
        Ok(())
    }
}
