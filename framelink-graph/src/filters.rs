//! The filter trait and built-in filters.

use crate::error::{GraphError, Result};
use crate::graph::GraphConfig;
use crate::link::{GraphFrame, LinkParams};
use crate::spec::ParsedFilter;
use framelink_core::frame::FrameBuffer;
use framelink_core::hw::HwDeviceRef;
use framelink_core::rational::Rational;
use framelink_core::tags::Tags;

/// A processing stage inside the graph.
pub trait GraphFilter: Send {
    /// Filter name.
    fn name(&self) -> &str;

    /// Receive the graph's hardware device before negotiation. The
    /// software built-ins ignore it; a device-backed filter keeps the
    /// reference.
    fn attach_hw_device(&mut self, _device: &HwDeviceRef) {}

    /// Given the input link parameters, decide the output link
    /// parameters. Called once during graph configuration.
    fn negotiate(&mut self, input: &LinkParams) -> Result<LinkParams>;

    /// Process one frame, producing zero or more output frames.
    fn filter(&mut self, frame: GraphFrame) -> Result<Vec<GraphFrame>>;

    /// Drain any buffered frames at end-of-stream.
    fn flush(&mut self) -> Result<Vec<GraphFrame>> {
        Ok(Vec::new())
    }

    /// Handle a runtime command. Returns true if the command was
    /// understood and applied.
    fn process_command(&mut self, _name: &str, _arg: &str) -> bool {
        false
    }

    /// Whether this filter handles any runtime commands.
    fn supports_commands(&self) -> bool {
        false
    }
}

fn invalid_param(filter: &str, message: impl Into<String>) -> GraphError {
    GraphError::InvalidParam {
        filter: filter.to_string(),
        message: message.into(),
    }
}

/// Pass-through filter.
pub struct NullFilter;

impl NullFilter {
    pub fn new(_parsed: &ParsedFilter) -> Result<Self> {
        Ok(Self)
    }
}

impl GraphFilter for NullFilter {
    fn name(&self) -> &str {
        "null"
    }

    fn negotiate(&mut self, input: &LinkParams) -> Result<LinkParams> {
        Ok(input.clone())
    }

    fn filter(&mut self, frame: GraphFrame) -> Result<Vec<GraphFrame>> {
        Ok(vec![frame])
    }
}

/// Nearest-neighbor video resizer. Software only; it refuses links
/// carrying device frames.
pub struct ScaleFilter {
    width: u32,
    height: u32,
    flags: i64,
    hw_device: Option<HwDeviceRef>,
}

impl ScaleFilter {
    pub fn new(parsed: &ParsedFilter, config: &GraphConfig) -> Result<Self> {
        let width = parse_dim(parsed, "width", 0)?;
        let height = parse_dim(parsed, "height", 1)?;
        // Per-instance flags override the graph-wide scale options
        let flags = match parsed.param("flags", usize::MAX) {
            Some(v) => v
                .parse()
                .map_err(|_| invalid_param("scale", format!("bad flags '{}'", v)))?,
            None => config.default_scale_flags(),
        };
        Ok(Self {
            width,
            height,
            flags,
            hw_device: None,
        })
    }

    /// Resampling-quality flags in effect for this instance.
    pub fn flags(&self) -> i64 {
        self.flags
    }
}

fn parse_dim(parsed: &ParsedFilter, key: &str, position: usize) -> Result<u32> {
    let value = parsed
        .param(key, position)
        .ok_or_else(|| invalid_param("scale", format!("missing {}", key)))?;
    let dim: u32 = value
        .parse()
        .map_err(|_| invalid_param("scale", format!("bad {} '{}'", key, value)))?;
    if dim == 0 {
        return Err(invalid_param("scale", format!("{} must be nonzero", key)));
    }
    Ok(dim)
}

impl GraphFilter for ScaleFilter {
    fn name(&self) -> &str {
        "scale"
    }

    fn attach_hw_device(&mut self, device: &HwDeviceRef) {
        self.hw_device = Some(device.clone());
    }

    fn negotiate(&mut self, input: &LinkParams) -> Result<LinkParams> {
        if input.hw_frames.is_some() {
            return Err(GraphError::Negotiation(match &self.hw_device {
                Some(device) => format!(
                    "scale cannot operate on {} frames; download to system memory first",
                    device.kind.name()
                ),
                None => "scale cannot operate on hardware frames".into(),
            }));
        }
        let mut out = input.clone();
        out.width = self.width;
        out.height = self.height;
        Ok(out)
    }

    fn filter(&mut self, frame: GraphFrame) -> Result<Vec<GraphFrame>> {
        if frame.width() == self.width && frame.height() == self.height {
            return Ok(vec![frame]);
        }

        let format = frame.format();
        let mut scaled = FrameBuffer::new(self.width, self.height, format);
        let (hsub, vsub) = format.chroma_subsampling();

        for plane in 0..frame.buffer.num_planes() {
            let (sw, sh, dw, dh) = if plane == 0 {
                (
                    frame.width() as usize,
                    frame.height() as usize,
                    self.width as usize,
                    self.height as usize,
                )
            } else {
                (
                    (frame.width() as usize).div_ceil(hsub as usize),
                    (frame.height() as usize).div_ceil(vsub as usize),
                    (self.width as usize).div_ceil(hsub as usize),
                    (self.height as usize).div_ceil(vsub as usize),
                )
            };
            let bps = format.bytes_per_sample(plane);
            let src_stride = frame.buffer.stride(plane);
            let dst_stride = scaled.stride(plane);

            if let (Some(src), Some(dst)) =
                (frame.buffer.plane(plane), scaled.plane_mut(plane))
            {
                for y in 0..dh {
                    let sy = y * sh / dh;
                    for x in 0..dw {
                        let sx = x * sw / dw;
                        let s = sy * src_stride + sx * bps;
                        let d = y * dst_stride + x * bps;
                        dst[d..d + bps].copy_from_slice(&src[s..s + bps]);
                    }
                }
            }
        }

        Ok(vec![GraphFrame {
            buffer: scaled,
            pts: frame.pts,
            sample_aspect_ratio: frame.sample_aspect_ratio,
            flags: frame.flags,
            metadata: frame.metadata,
            hw_frames: None,
        }])
    }
}

/// Rewrites the sample aspect ratio on the link and on each frame.
pub struct SetSarFilter {
    sar: Rational,
}

impl SetSarFilter {
    pub fn new(parsed: &ParsedFilter) -> Result<Self> {
        let value = parsed
            .param("sar", 0)
            .ok_or_else(|| invalid_param("setsar", "missing sar"))?;
        let sar = parse_ratio(value)
            .ok_or_else(|| invalid_param("setsar", format!("bad ratio '{}'", value)))?;
        Ok(Self { sar })
    }
}

fn parse_ratio(value: &str) -> Option<Rational> {
    match value.split_once('/') {
        Some((n, d)) => {
            let num = n.trim().parse().ok()?;
            let den: i64 = d.trim().parse().ok()?;
            if den == 0 {
                return None;
            }
            Some(Rational::new(num, den))
        }
        None => {
            let num = value.trim().parse().ok()?;
            Some(Rational::new(num, 1))
        }
    }
}

impl GraphFilter for SetSarFilter {
    fn name(&self) -> &str {
        "setsar"
    }

    fn negotiate(&mut self, input: &LinkParams) -> Result<LinkParams> {
        let mut out = input.clone();
        out.sample_aspect_ratio = self.sar;
        Ok(out)
    }

    fn filter(&mut self, mut frame: GraphFrame) -> Result<Vec<GraphFrame>> {
        frame.sample_aspect_ratio = self.sar;
        Ok(vec![frame])
    }
}

/// Brightness adjustment on the first plane; accepts the `brightness`
/// runtime command.
pub struct EqFilter {
    brightness: f32,
}

impl EqFilter {
    pub fn new(parsed: &ParsedFilter) -> Result<Self> {
        let brightness = match parsed.param("brightness", 0) {
            Some(v) => v
                .parse()
                .map_err(|_| invalid_param("eq", format!("bad brightness '{}'", v)))?,
            None => 0.0,
        };
        Ok(Self { brightness })
    }

    /// Current brightness offset, for tests.
    pub fn brightness(&self) -> f32 {
        self.brightness
    }
}

impl GraphFilter for EqFilter {
    fn name(&self) -> &str {
        "eq"
    }

    fn negotiate(&mut self, input: &LinkParams) -> Result<LinkParams> {
        Ok(input.clone())
    }

    fn filter(&mut self, mut frame: GraphFrame) -> Result<Vec<GraphFrame>> {
        let offset = (self.brightness * 255.0) as i16;
        if offset != 0 {
            if let Some(luma) = frame.buffer.plane_mut(0) {
                for sample in luma.iter_mut() {
                    *sample = (*sample as i16 + offset).clamp(0, 255) as u8;
                }
            }
        }
        Ok(vec![frame])
    }

    fn process_command(&mut self, name: &str, arg: &str) -> bool {
        if name != "brightness" {
            return false;
        }
        match arg.parse() {
            Ok(v) => {
                self.brightness = v;
                true
            }
            Err(_) => false,
        }
    }

    fn supports_commands(&self) -> bool {
        true
    }
}

/// Attaches one metadata tag to every frame passing through.
pub struct SetMetaFilter {
    key: String,
    value: String,
}

impl SetMetaFilter {
    pub fn new(parsed: &ParsedFilter) -> Result<Self> {
        let param = parsed
            .params
            .first()
            .ok_or_else(|| invalid_param("setmeta", "missing key=value"))?;
        let key = param
            .key
            .clone()
            .ok_or_else(|| invalid_param("setmeta", "parameter must be key=value"))?;
        Ok(Self {
            key,
            value: param.value.clone(),
        })
    }
}

impl GraphFilter for SetMetaFilter {
    fn name(&self) -> &str {
        "setmeta"
    }

    fn negotiate(&mut self, input: &LinkParams) -> Result<LinkParams> {
        Ok(input.clone())
    }

    fn filter(&mut self, mut frame: GraphFrame) -> Result<Vec<GraphFrame>> {
        frame
            .metadata
            .get_or_insert_with(Tags::new)
            .set(self.key.clone(), self.value.clone());
        Ok(vec![frame])
    }
}

/// Duplicates the input to two outputs.
///
/// A chain ending in `split` leaves a dangling output, which the graph
/// rejects at configure time; that is the point of keeping it in the
/// registry.
pub struct SplitFilter;

impl SplitFilter {
    pub fn new(_parsed: &ParsedFilter) -> Result<Self> {
        Ok(Self)
    }
}

impl GraphFilter for SplitFilter {
    fn name(&self) -> &str {
        "split"
    }

    fn negotiate(&mut self, input: &LinkParams) -> Result<LinkParams> {
        Ok(input.clone())
    }

    fn filter(&mut self, frame: GraphFrame) -> Result<Vec<GraphFrame>> {
        Ok(vec![frame.clone(), frame])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::parse_graph_spec;
    use framelink_core::frame::PixelFormat;
    use framelink_core::timestamp::{TimeBase, Timestamp};

    fn test_link(width: u32, height: u32) -> LinkParams {
        LinkParams {
            width,
            height,
            format: PixelFormat::Yuv420p,
            time_base: TimeBase::MICROSECONDS,
            sample_aspect_ratio: Rational::ONE,
            hw_frames: None,
        }
    }

    fn test_frame(width: u32, height: u32) -> GraphFrame {
        GraphFrame {
            buffer: FrameBuffer::new(width, height, PixelFormat::Yuv420p),
            pts: Timestamp::new(0, TimeBase::MICROSECONDS),
            sample_aspect_ratio: Rational::ONE,
            flags: Default::default(),
            metadata: None,
            hw_frames: None,
        }
    }

    fn parsed(spec: &str) -> ParsedFilter {
        parse_graph_spec(spec).unwrap().remove(0)
    }

    #[test]
    fn test_scale_negotiates_geometry() {
        let mut f = ScaleFilter::new(&parsed("scale=320:240"), &GraphConfig::default()).unwrap();
        let out = f.negotiate(&test_link(640, 480)).unwrap();
        assert_eq!((out.width, out.height), (320, 240));
    }

    #[test]
    fn test_scale_resizes_buffer() {
        let mut f = ScaleFilter::new(&parsed("scale=320:240"), &GraphConfig::default()).unwrap();
        let out = f.filter(test_frame(640, 480)).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].width(), 320);
        assert_eq!(out[0].height(), 240);
    }

    #[test]
    fn test_scale_keyed_params() {
        let f = ScaleFilter::new(
            &parsed("scale=width=1280:height=720:flags=2"),
            &GraphConfig::default(),
        )
        .unwrap();
        assert_eq!(f.flags(), 2);
    }

    #[test]
    fn test_scale_rejects_zero() {
        assert!(ScaleFilter::new(&parsed("scale=0:240"), &GraphConfig::default()).is_err());
    }

    #[test]
    fn test_setsar_parses_ratio() {
        let mut f = SetSarFilter::new(&parsed("setsar=4/3")).unwrap();
        let out = f.negotiate(&test_link(640, 480)).unwrap();
        assert_eq!(out.sample_aspect_ratio, Rational::new(4, 3));
    }

    #[test]
    fn test_eq_command() {
        let mut f = EqFilter::new(&parsed("eq=brightness=0.0")).unwrap();
        assert!(f.process_command("brightness", "0.5"));
        assert!((f.brightness() - 0.5).abs() < f32::EPSILON);
        assert!(!f.process_command("contrast", "1.0"));
        assert!(!f.process_command("brightness", "not-a-number"));
    }

    #[test]
    fn test_setmeta_tags_frames() {
        let mut f = SetMetaFilter::new(&parsed("setmeta=lavfi.test=1")).unwrap();
        let out = f.filter(test_frame(16, 16)).unwrap();
        assert_eq!(
            out[0].metadata.as_ref().and_then(|t| t.get("lavfi.test")),
            Some("1")
        );
    }

    #[test]
    fn test_split_duplicates() {
        let mut f = SplitFilter::new(&parsed("split")).unwrap();
        assert_eq!(f.filter(test_frame(16, 16)).unwrap().len(), 2);
    }
}
