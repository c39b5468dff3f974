//! A small suite with hand-checked answers.
//!
//! Grid 192x144 (Endgame), one-day periods of 72 steps, 10-day dumps and
//! meaning periods of 30/90/360 days. Usage profiles:
//! - `UPM`    -> stream 5, reinitialised monthly
//! - `UP6`    -> stream 6, reinitialised every 6 hours, 8000 reserved headers
//! - `UPMEAN` -> climate-mean file, meaning tag 1
//! - `UPDUMP` -> dump (not estimated), `UPOFF` -> ignored profile

/// Run configuration for the reference suite.
pub const SUITE_CONFIG: &str = r#"
meta=um-atmos/vn10.3

[command]
default=um-atmos

[namelist:io_control]
io_field_padding=512

[namelist:nlsizes]
global_row_length=192
global_rows=144

[namelist:nlstcall]
run_target_end=1,0,0,0,0,0

[namelist:nlstcgen]
dump_frequency_units=2
dumpfreqim=10
l_meaning_sequence=.true.
mean_1_filename_base='$DATAM/${RUNID}a.pm'
mean_2_filename_base='$DATAM/${RUNID}a.ps'
mean_3_filename_base='$DATAM/${RUNID}a.py'
!mean_4_filename_base='$DATAM/${RUNID}a.px'
meanfreqim=3,3,4,10
ppselectim=1,1,1,0
secs_per_periodim=86400
steps_per_periodim=72

[namelist:run_dyn]
l_endgame=.true.

[namelist:nlstcall_pp(pp5)]
file_id='pp5'
reinit_step=1
reinit_unit=4
reserved_headers=0

[namelist:nlstcall_pp(pp6)]
file_id='pp6'
reinit_step=6
reinit_unit=1
reserved_headers=8000

[namelist:use(a1b2c3d4)]
file_id='pp5'
locn=3
use_name='UPM'

[namelist:use(b2c3d4e5)]
file_id='pp6'
locn=3
use_name='UP6'

[namelist:use(c3d4e5f6)]
locn=2
macrotag=1
use_name='UPMEAN'

[namelist:use(d4e5f6a7)]
locn=1
use_name='UPDUMP'

[!namelist:use(e5f6a7b8)]
file_id='pp9'
locn=3
use_name='UPOFF'

[namelist:domain(dom1)]
dom_name='DIAG'
imn=0
iopa=1
iopl=5

[namelist:domain(dom2)]
dom_name='DALLTH'
imn=0
iopa=1
iopl=2
levb=1
levt=85

[namelist:domain(dom3)]
dom_name='DP4'
imn=0
iopa=1
iopl=3
rlevlst=1000.0,850.0,500.0,250.0

[namelist:domain(dom4)]
dom_name='DZMN'
imn=2
iopa=1
iopl=3
rlevlst=850.0

[namelist:domain(dom5)]
dom_name='DSOIL'
imn=0
iopa=1
iopl=6
levt=4

[namelist:domain(dom6)]
dom_name='DNHEM'
imn=0
iopa=2
iopl=5

[namelist:domain(dom7)]
dom_name='DTHNOMN'
!imn=0
iopa=1
iopl=2
levb=1
levt=85

[namelist:time(t1)]
ifre=6
iopt=1
ityp=1
tim_name='T6H'
unt3=2

[namelist:time(t2)]
ifre=1
iopt=1
ityp=3
tim_name='TDAYM'
unt3=3

[namelist:time(t3)]
ifre=30
iopt=1
ityp=3
tim_name='TMONMN'
unt3=3

[namelist:time(t4)]
iedt=1980,1,1,0,0,0
ifre=1
iopt=3
isdt=1978,9,1,0,0,0
ityp=1
tim_name='TBOUND'
unt3=3

[namelist:time(t5)]
ifre=1
iopt=1
ityp=4
tim_name='TSERIES'
unt3=1

[namelist:time(t6)]
ifre=180
iopt=1
ityp=3
tim_name='T180D'
unt3=3

[namelist:time(t7)]
iopt=2
ityp=1
tim_name='TLIST'

[namelist:streq(00024_1)]
dom_name='DIAG'
isec=0
item=24
tim_name='T6H'
use_name='UP6'

[namelist:streq(03236_1)]
dom_name='DIAG'
isec=3
item=236
tim_name='TDAYM'
use_name='UP6'

[namelist:streq(05216_1)]
dom_name='DIAG'
isec=5
item=216
tim_name='TSERIES'
use_name='UP6'

[namelist:streq(00002_1)]
dom_name='DALLTH'
isec=0
item=2
tim_name='TMONMN'
use_name='UPM'

[namelist:streq(16222_1)]
dom_name='DIAG'
isec=16
item=222
tim_name='T180D'
use_name='UPM'

[namelist:streq(08223_1)]
dom_name='DSOIL'
isec=8
item=223
tim_name='TMONMN'
use_name='UPM'

[namelist:streq(26004_1)]
dom_name='DIAG'
isec=26
item=4
tim_name='TDAYM'
use_name='UPM'

[namelist:streq(30201_1)]
dom_name='DZMN'
isec=30
item=201
tim_name='TDAYM'
use_name='UPMEAN'

[namelist:streq(00024_2)]
dom_name='DNHEM'
isec=0
item=24
tim_name='TMONMN'
use_name='UPMEAN'

[namelist:streq(00033_1)]
dom_name='DIAG'
isec=0
item=33
tim_name='TDAYM'
use_name='UPDUMP'

[namelist:streq(00024_3)]
dom_name='DIAG'
isec=0
item=24
tim_name='T6H'
use_name='UPOFF'

[namelist:streq(03236_2)]
dom_name='DTHNOMN'
isec=3
item=236
tim_name='TBOUND'
use_name='UPM'

[namelist:streq(00002_2)]
dom_name='DIAG'
isec=0
item=2
tim_name='TLIST'
use_name='UP6'

[!namelist:streq(00024_4)]
dom_name='DIAG'
isec=0
item=24
tim_name='TDAYM'
use_name='UPM'
"#;

/// STASHmaster extract covering every code requested by [`SUITE_CONFIG`].
pub const SUITE_STASHMASTER: &str = r#"H1| SUBMODEL_NUMBER=1
H2| SUBMODEL_NAME=ATMOS
H3| UM_VERSION=10.3
#
#|Model |Sectn | Item |Name                                |
#|Space |Point | Time | Grid |LevelT|LevelF|LevelL|PseudT|PseudF|PseudL|LevCom|
#| Option Codes                   | Version Mask         | Halo |
#|DataT |DumpP | PC1  PC2  PC3  PC4  PC5  PC6  PC7  PC8  PC9  PCA |
#|Rotate| PPFC | USER | LBVC | BLEV | TLEV |RBLEVV| CFLL | CFFF |
#
#===============================================================================
#
1|    1 |    0 |    2 |U COMPNT OF WIND AFTER TIMESTEP     |
2|    2 |    0 |    1 |   18 |    2 |    1 |    2 |    0 |    0 |    0 |    0 |
3| 000000000000000000000000000000 | 00000000000000000001 |    3 |
4|    1 |    2 | -3  -3  -3  -3 -14  21 -99 -99 -99 -99 |
5|    0 |   56 |    0 |   65 |    0 |    0 |    0 |    0 |    0 |
#
1|    1 |    0 |   24 |SURFACE TEMPERATURE AFTER TIMESTEP  |
2|    2 |    0 |    1 |    1 |    5 |   -1 |   -1 |    0 |    0 |    0 |    0 |
3| 000000000000000000000000000000 | 00000000000000000001 |    1 |
4|    1 |    2 | -3  -3  -3  -3  -1  21 -99 -99 -99 -99 |
5|    0 |   16 |    0 |  129 |    0 |    0 |    0 |    0 |    0 |
#
1|    1 |    0 |   33 |OROGRAPHY (/STRAT LOWER BC)         |
2|    1 |    0 |    0 |    1 |    5 |   -1 |   -1 |    0 |    0 |    0 |    0 |
3| 000000000000000000000000000000 | 00000000000000000001 |    1 |
4|    1 |    2 | -3  -3  -3  -3 -99 -99 -99 -99 -99 -99 |
5|    0 |    1 |    0 |  129 |    0 |    0 |    0 |    0 |    0 |
#
1|    1 |    3 |  236 |TEMPERATURE AT 1.5M                 |
2|    0 |    0 |    1 |    1 |    5 |   -1 |   -1 |    0 |    0 |    0 |    0 |
3| 000000000000000000000000000000 | 00000000000000000001 |    1 |
4|    1 |    0 | -3  -3  -3  -3 -12  21 -99 -99 -99 -99 |
5|    0 | 3236 |    0 |  129 |    0 |    0 |    0 |    0 |    0 |
#
1|    1 |    5 |  216 |TOTAL PRECIPITATION RATE     KG/M2/S|
2|    0 |    0 |    4 |    1 |    5 |   -1 |   -1 |    0 |    0 |    0 |    0 |
3| 000000000000000000000000000000 | 00000000000000000001 |    1 |
4|    1 |    0 | -3  -3  -3  -3 -99 -99 -99 -99 -99 -99 |
5|    0 |   90 |    0 |  129 |    0 |    0 |    0 |    0 |    0 |
#
1|    1 |    8 |  223 |SOIL MOISTURE CONTENT IN A LAYER    |
2|    0 |    0 |    1 |   21 |    6 |    1 |    4 |    0 |    0 |    0 |    0 |
3| 000000000000000000000000000000 | 00000000000000000001 |    1 |
4|    1 |    0 | -3  -3  -3  -3 -99 -99 -99 -99 -99 -99 |
5|    0 |  122 |    0 |    6 |    0 |    0 |    0 |    0 |    0 |
#
1|    1 |   16 |  222 |PRESSURE AT MEAN SEA LEVEL          |
2|    0 |    0 |    1 |    1 |    5 |   -1 |   -1 |    0 |    0 |    0 |    0 |
3| 000000000000000000000000000000 | 00000000000000000001 |    1 |
4|    1 |    0 | -3  -3  -3  -3 -99  21 -99 -99 -99 -99 |
5|    0 |    8 |    0 |  128 |    0 |    0 |    0 |    0 |    0 |
#
1|    1 |   26 |    4 |TOTAL OUTFLOW FROM A RIVER POINT    |
2|    0 |    0 |    1 |   23 |    5 |   -1 |   -1 |    0 |    0 |    0 |    0 |
3| 000000000000000000000000000000 | 00000000000000000001 |    1 |
4|    1 |    0 | -3  -3  -3  -3  -6 -99 -99 -99 -99 -99 |
5|    0 | 1707 |    0 |  129 |    0 |    0 |    0 |    0 |    0 |
#
1|    1 |   30 |  201 |U COMPNT WIND ON P LEV/UV GRID      |
2|    0 |    0 |    1 |   18 |    3 |   -1 |   -1 |    0 |    0 |    0 |    0 |
3| 000000000000000000000000000000 | 00000000000000000001 |    1 |
4|    1 |    0 | -3  -3  -3  -3 -10  21 -99 -99 -99 -99 |
5|    0 |   56 |    0 |    8 |    0 |    0 |    0 |    0 |    0 |
#
1|   -1 |   -1 |   -1 |END OF FILE MARK                    |
2|    0 |    0 |    0 |    0 |    0 |    0 |    0 |    0 |    0 |    0 |    0 |
3| 000000000000000000000000000000 | 00000000000000000000 |    0 |
4|    0 |    0 |  0   0   0   0   0   0   0   0   0   0 |
5|    0 |    0 |    0 |    0 |    0 |    0 |    0 |    0 |    0 |
"#;

/// Packing-ratio database for [`SUITE_CONFIG`]. `1_08_223` is deliberately
/// present for a field whose packing code forbids packing.
pub const SUITE_RATIO_DB: &str = "1_00_024 30.0 20.0
1_00_002 40.0 30.0
1_26_004 50.0 50.0
1_30_201 20.0 10.0
1_08_223 60.0 40.0
not-a-ratio-line
";

/// Storage price used by the reference answers.
pub const SUITE_PRICE_PER_TIB: f64 = 85.0;

/// Reference answers for [`SUITE_CONFIG`], in 8-byte words unless noted.
pub mod expected {
    pub const DUMP_FREQ_STEPS: f64 = 720.0;
    pub const MEANING_PERIODS: [u64; 4] = [30, 90, 360, 0];
    pub const RUN_LENGTH_DAYS: u64 = 360;

    /// Data start for profiles with the minimum 4096 reserved headers.
    pub const DATA_START_WORDS_MIN: u64 = 327_680;
    pub const HEADER_WORDS_NO_DATA_MIN: u64 = 263_172;
    /// Data start for stream 6 (8000 reserved headers).
    pub const DATA_START_WORDS_PP6: u64 = 524_288;
    pub const HEADER_WORDS_NO_DATA_PP6: u64 = 513_028;

    /// Stream 5 data words per (day, month, quarter, year).
    pub const STREAM5_WORDS: [f64; 4] = [32_512.0, 1_908_480.0, 5_725_440.0, 22_901_760.0];
    pub const STREAM5_UNPACKED_YEAR: f64 = 52_936_704.0;
    pub const STREAM5_FIELDS_YEAR: f64 = 1_428.0;

    /// Stream 6 data words per (day, month, quarter, year).
    pub const STREAM6_WORDS: [f64; 4] = [55_296.0, 1_658_880.0, 4_976_640.0, 19_906_560.0];
    pub const STREAM6_FILES_PER_DAY: f64 = 4.0;

    /// Meaning tag 1 data words per (day, month, quarter, year).
    pub const MEAN1_WORDS: [f64; 4] = [0.0, 512.0, 4_096.0, 8_704.0];
}
